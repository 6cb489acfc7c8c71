// End-to-end tests for the entitlement client.
//
// Each test context starts an in-process fake of the payments and
// preferences API on 127.0.0.1:0, together with a few pages protected by the
// route guard middleware. The client side is wired exactly as the binary
// wires it: reqwest-backed repositories over an in-memory local store.

mod helpers;
mod test_preferences;
mod test_route_guard;
mod test_session;

//! Test support: a PostgreSQL-backed service context and an in-memory order store.


pub(crate) use context::TestContext;

//! # Delivery Engine (C4)
//!
//! Pops delivery tasks from the Redis-backed task queue and sends them to
//! subscriber endpoints, with HMAC signing, exponential backoff retry, and
//! an append-only attempt log.
//!
//! ```text
//! Task Queue (Redis)     Delivery Engine          Subscriber Endpoint
//! ───────────────────    ─────────────────         ────────────────────
//! ready list ──BRPOP──>  worker: resolve sub
//!                        │      filter event type
//!                        │      sign + POST ───────────────────────>│
//!                        │                                          │
//!                        │<──── 2xx / 4xx / 5xx / timeout ──────────┤
//!                        │
//!                        ├── success  -> log SUCCESS, done
//!                        └── failure  -> log FAILED_ATTEMPT,
//!                                        push_delayed(next attempt)
//!                                        or log FAILURE if exhausted
//! ```
//!
//! A second loop promotes due members of the delay set into the ready
//! list on a short interval (the scheduler), and a third sweeps expired
//! `webhook_logs` rows on `RETENTION_SWEEP_INTERVAL`.

pub mod backoff;
pub mod execute;
pub mod health;
pub mod metrics;
pub mod retention;
pub mod state;
pub mod worker;

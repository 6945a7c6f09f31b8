//! Request dispatch
//!
//! fingerprint → cache lookup → strategy resolution → ordered attempts →
//! cache store. See [`Dispatcher::dispatch`].

mod dispatcher;
mod error;
mod outcome;


pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use outcome::{AttemptRecord, CacheStatus, DispatchOptions, DispatchOutcome, ServedBy};

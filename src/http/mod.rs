//! JSON servers over the evaluators. Handlers stay thin: they hand the raw upload to the
//! evaluator and map its result onto HTTP, user errors to 400 and internal-consistency errors
//! to 500. State shared between requests is read-only so no locking is required.
pub mod basket_v1;

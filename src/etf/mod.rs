//! Evaluators are the main interface presented to clients. An evaluator takes an uploaded
//! basket of constituents, validates it against an input and produces the derived outputs
//! returned to the client. Validation is an ordered chain of checks that stops at the first
//! failure, so a request only ever surfaces one error even when several conditions are
//! violated at once.
pub mod basket_v1;

//! # What is basketd?
//!
//! basketd is a JSON server that prices a user-submitted ETF basket against a table of
//! historical daily closes. Clients upload a CSV of constituents (name + weight), the server
//! validates it against the price table loaded at startup and returns the latest close for
//! each constituent, a daily price series for the weighted basket, and the top-5 holdings by
//! value. The lib can be imported directly for testing and examples within Rust; the standard
//! deployment is the JSON server.
//!
//! # Implementation
//!
//! The server is composed of:
//! - An input, [PriceTable](crate::input::prices::PriceTable), which wraps the close-price
//! dataset in a read-only date-indexed interface. It is built once before the server starts
//! and shared by every request.
//! - An evaluator, [evaluate](crate::etf::basket_v1::evaluate), which runs an ordered chain of
//! validation checks over the uploaded basket and then computes the derived outputs. The
//! chain stops at the first failing check so clients only ever see one error per request.
//! - The server implementation returning JSON responses over the evaluator.
//!
//! ``
//! cargo run --bin basket_server_v1 [ipv4_address] [port] [prices_csv]
//! ``
pub mod etf;
pub mod http;
pub mod input;

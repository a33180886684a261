//! # lockstep-bench: Performance benchmarks for Lockstep
//!
//! This crate holds the Criterion benchmarks for the simulation kernel
//! and the wire protocol.
//!
//! ## Benchmarks
//!
//! - **kernel**: Instance lifecycle, stepping, and value access
//! - **wire**: Protocol serialization/deserialization
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p lockstep-bench
//!
//! # Run specific benchmark
//! cargo bench -p lockstep-bench --bench kernel
//!
//! # Save baseline for comparison
//! cargo bench -p lockstep-bench --bench wire -- --save-baseline main
//! ```

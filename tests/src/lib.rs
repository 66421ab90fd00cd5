//! # Quantum-Chain Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks
//! └── src/integration/  # multi-node scenarios over loopback TCP
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qc-tests integration::
//! cargo bench -p qc-tests
//! ```

pub mod integration;

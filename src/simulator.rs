//! Balance simulator: greedy best-payback play driven through `reduce`.
//! Run with: cargo test simulate_greedy -- --nocapture

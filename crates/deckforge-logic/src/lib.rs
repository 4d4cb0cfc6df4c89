//! Pure progression math for Deckforge.
//!
//! This crate contains the card progression rules that are independent of any
//! storage, clock, or runtime. Functions take plain integers and return result
//! structs, making them unit-testable and portable between the engine and the
//! headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Fixed exchange rates, caps, and request bounds |
//! | [`levels`] | Level transition state machine with cap enforcement |
//! | [`regen`] | Time-based energy regeneration arithmetic |
//! | [`steps`] | Step allocation under energy and headroom constraints |

pub mod constants;
pub mod levels;
pub mod regen;
pub mod steps;

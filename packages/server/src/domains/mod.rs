// Business domains
pub mod lifecycle;
pub mod matching;
pub mod member;
pub mod scheduling;

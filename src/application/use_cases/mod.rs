pub mod waitlist;
pub mod waitlist_stats;

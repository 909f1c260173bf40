pub mod daily_stats;
pub mod user_type;
pub mod waitlist_entry;

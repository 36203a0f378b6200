pub mod calendar;
pub mod daily_note;
pub mod filter;
pub mod item;
pub mod next_action;
pub mod normalize;
pub mod person_date;
pub mod props;
pub mod repeat;
pub mod sort;
pub mod surface;
pub mod tickle;
pub mod timestamp;
pub mod upcoming;
pub mod urgent;
pub mod waiting;

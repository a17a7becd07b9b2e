pub mod message_recipients;
pub mod submission_filter;
pub mod submission_list;
pub mod submission_sort;
pub mod submission_state;

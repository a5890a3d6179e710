pub mod reply_message;

pub mod razorpay;

pub use razorpay::{RazorpayClient, RazorpayConfig, RazorpayOrder, RazorpayPayment};

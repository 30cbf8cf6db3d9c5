//! Local servers standing in for formula repositories in tests.
//!
//! [LocalHttp] serves a fixed set of files over plain HTTP and [LocalS3]
//! runs an in-memory S3-compatible bucket. Both bind an ephemeral port on
//! the loopback interface and stop when [LocalHttp::stop] or
//! [LocalS3::stop] is called.

mod http;
pub use http::*;

mod s3;
pub use s3::*;

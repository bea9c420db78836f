//! End-to-end tests driving the public library surface the way the
//! slideshow host would.

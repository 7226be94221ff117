use std::sync::Arc;

/// Inputs at least this large run the codec on the blocking pool.
pub const OFFLOAD_THRESHOLD: usize = 64 * 1024;

/// Runs a codec function over `input`, off the async worker for large inputs.
///
/// Small inputs run inline, which keeps commit ordering observable under a
/// paused test clock.
pub(crate) async fn run_codec<T, F>(input: Arc<str>, f: F) -> T
where
	F: Fn(&str) -> T + Copy + Send + 'static,
	T: Send + 'static,
{
	if input.len() < OFFLOAD_THRESHOLD {
		return f(&input);
	}

	let shared = Arc::clone(&input);
	match tokio::task::spawn_blocking(move || f(&shared)).await {
		Ok(out) => out,
		Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
		Err(err) => {
			tracing::debug!(error = %err, bytes = input.len(), "sync.offload.cancelled");
			f(&input)
		}
	}
}

/// Render slot indices for human-readable output, e.g. "1, 3".
pub fn format_slot_list(slots: &[usize]) -> String {
    slots
        .iter()
        .map(|slot| slot.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

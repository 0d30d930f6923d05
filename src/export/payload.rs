//! Payload-size estimation for poll-interval tuning.

const MB: u64 = 1024 * 1024;

/// Rough payload estimate from video duration: about 1 MB per 10 seconds,
/// a conservative figure for typical compression.
pub fn estimate_payload_size(duration_seconds: f64) -> u64 {
    if duration_seconds <= 0.0 {
        return 0;
    }
    (duration_seconds * 100_000.0).round() as u64
}

/// Coarse size bucket used in user-facing export output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl SizeCategory {
    pub fn of(size_bytes: u64) -> Self {
        let mb = size_bytes / MB;
        if mb < 10 {
            SizeCategory::Small
        } else if mb < 50 {
            SizeCategory::Medium
        } else if mb < 100 {
            SizeCategory::Large
        } else {
            SizeCategory::VeryLarge
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeCategory::Small => "Small file",
            SizeCategory::Medium => "Medium file",
            SizeCategory::Large => "Large file",
            SizeCategory::VeryLarge => "Very large file",
        }
    }

    pub fn estimated_time(&self) -> &'static str {
        match self {
            SizeCategory::Small => "1-2 minutes",
            SizeCategory::Medium => "2-5 minutes",
            SizeCategory::Large => "5-10 minutes",
            SizeCategory::VeryLarge => "10+ minutes",
        }
    }
}

/// Human-readable size, KB below 1 MB, GB above 1024 MB.
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "Unknown size".to_string();
    }

    let mb = size_bytes as f64 / MB as f64;
    if mb < 1.0 {
        format!("{} KB", (size_bytes as f64 / 1024.0).round() as u64)
    } else if mb < 1024.0 {
        format!("{} MB", mb.round() as u64)
    } else {
        format!("{} GB", (mb / 1024.0).round() as u64)
    }
}

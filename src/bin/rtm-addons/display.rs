//! Terminal output helpers

use std::io::Write;

use rtm_addon_manager_lib::core::catalog::{TrainCard, TrainDetail};
use rtm_addon_manager_lib::core::downloader::DownloadProgress;
use rtm_addon_manager_lib::core::state::{ManagerSettings, TermsPrompt};

pub fn success(msg: &str) {
    println!("✓ {msg}");
}

pub fn warning(msg: &str) {
    eprintln!("! {msg}");
}

pub fn error(msg: &str) {
    eprintln!("Error: {msg}");
}

pub fn cards(cards: &[TrainCard]) {
    if cards.is_empty() {
        println!("No trains found.");
        return;
    }

    for card in cards {
        println!("{:>6}  {}", card.id, card.name);
        let badges: Vec<&str> = card
            .regions
            .iter()
            .chain(card.features.iter())
            .copied()
            .collect();
        if !badges.is_empty() {
            println!("        {}", badges.join(" · "));
        }
    }
    println!();
    println!("{} train(s)", cards.len());
}

pub fn detail(detail: &TrainDetail) {
    println!("{}  (#{})", detail.name, detail.id);
    println!();

    if let Some(url) = &detail.image_url {
        println!("  Image:     {url}");
    }
    if !detail.regions.is_empty() {
        println!("  地域:      {}", detail.regions.join(", "));
    }
    if !detail.features.is_empty() {
        println!("  機能:      {}", detail.features.join(", "));
    }
    if let Some(pass) = &detail.download_pass {
        println!("  Password:  {pass}");
    }

    if let Some(description) = &detail.description {
        println!();
        for line in description.lines() {
            println!("  > {line}");
        }
    }

    println!();
    if detail.versions.is_empty() {
        println!("  Versions:  (none)");
    } else {
        println!("  Versions:");
        for v in &detail.versions {
            let marker = if detail.current_version.as_deref() == Some(v.as_str()) {
                "*"
            } else {
                " "
            };
            let url = detail
                .version_links
                .iter()
                .find(|link| &link.version == v)
                .map(|link| link.url.as_str())
                .unwrap_or("");
            println!("   {marker} {v:<12} {url}");
        }
    }

    match &detail.download_url {
        Some(url) => println!("  Download:  {url}"),
        None => println!("  Download:  unavailable (no download link)"),
    }
    if let Some(m) = detail.mismatch {
        println!(
            "  Note: version count ({}) and URL count ({}) differ; the first URL is used.",
            m.versions, m.links
        );
    }
    if detail.has_terms {
        println!("  Terms of use must be accepted before downloading.");
    }
}

pub fn terms(prompt: &TermsPrompt) {
    println!("── {} ──", prompt.title);
    println!("{}", prompt.body);
    println!();
}

pub fn progress(p: &DownloadProgress) {
    let mut err = std::io::stderr();
    let _ = match p.total_bytes {
        Some(total) if total > 0 => write!(
            err,
            "\r{}: {} / {} KiB ({}%)",
            p.file_name,
            p.bytes_downloaded / 1024,
            total / 1024,
            p.bytes_downloaded.saturating_mul(100) / total
        ),
        _ => write!(err, "\r{}: {} KiB", p.file_name, p.bytes_downloaded / 1024),
    };
    let _ = err.flush();
}

pub fn progress_done() {
    eprintln!();
}

pub fn settings(settings: &ManagerSettings, effective_api_base: Option<&str>) {
    println!(
        "api_base_url:      {}",
        settings.api_base_url.as_deref().unwrap_or("(unset)")
    );
    println!(
        "effective base:    {}",
        effective_api_base.unwrap_or("(not configured)")
    );
    println!(
        "download_dir:      {}",
        settings.effective_download_dir().display()
    );
    println!("download_behavior: {:?}", settings.download_behavior);
}

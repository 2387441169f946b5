use std::cmp::Ordering;
use std::time::Instant;

use xget_core::{ClassificationInput, Interceptor, Settings};

pub struct BenchOptions {
    pub links: usize,
    pub iterations: usize,
    pub seed: u32,
}

#[derive(Clone)]
struct BenchLink {
    url: String,
    text: String,
    has_download_attribute: bool,
}

pub struct BenchResult {
    pub avg_us: f64,
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
    pub ops_per_sec: f64,
    pub download_pct: f64,
}

pub const DEFAULT_SEED: u32 = 0xc0ffee;

fn create_rng(seed: u32) -> impl FnMut() -> f64 {
    let mut state = seed;
    move || {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        (state as f64) / (u32::MAX as f64)
    }
}

fn pick<T: Clone>(items: &[T], rand: &mut impl FnMut() -> f64) -> T {
    let idx = (rand() * items.len() as f64).floor() as usize;
    items[idx.min(items.len() - 1)].clone()
}

fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let idx = ((values.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}

fn generate_links(count: usize, seed: u32) -> Vec<BenchLink> {
    const HOSTS: &[&str] = &[
        "github.com",
        "gitlab.com",
        "huggingface.co",
        "example.com",
        "docs.rs",
        "crates.io",
    ];
    const PATHS: &[&str] = &[
        "/org/repo",
        "/org/repo/releases",
        "/org/repo/releases/download/v1.2.0/tool-linux-x64.tar.gz",
        "/org/repo/archive/refs/tags/v1.2.0.zip",
        "/org/repo/raw/main/install.sh",
        "/org/repo/-/archive/main/repo-main.tar.gz",
        "/org/repo/-/releases/v1/downloads/app.bin",
        "/org/model/resolve/main/model.safetensors",
        "/org/repo/blob/main/README.md",
        "/docs/guide.pdf",
        "/search?q=release",
    ];
    const TEXTS: &[&str] = &["", "Download", "Releases", "Source code (zip)", "Get file", "README"];

    let mut rng = create_rng(seed);
    let mut links = Vec::with_capacity(count);

    for _ in 0..count {
        let host = pick(HOSTS, &mut rng);
        let path = pick(PATHS, &mut rng);
        let text = pick(TEXTS, &mut rng);
        links.push(BenchLink {
            url: format!("https://{}{}", host, path),
            text: text.to_string(),
            has_download_attribute: rng() < 0.05,
        });
    }

    links
}

fn warmup(interceptor: &Interceptor<'_>, links: &[BenchLink], settings: &Settings) {
    for _ in 0..10 {
        for link in links {
            let _ = process_link(interceptor, link, settings);
        }
    }
}

fn process_link(interceptor: &Interceptor<'_>, link: &BenchLink, settings: &Settings) -> bool {
    let input = ClassificationInput::new(&link.url, link.has_download_attribute, &link.text);
    if !interceptor.classifier().is_download(&input) {
        return false;
    }
    let _ = interceptor.rewriter().rewrite(&link.url, settings);
    true
}

pub fn run_bench(interceptor: &Interceptor<'_>, settings: &Settings, options: &BenchOptions) -> Result<BenchResult, String> {
    if options.links == 0 || options.iterations == 0 {
        return Err("links and iterations must be greater than zero".to_string());
    }

    let links = generate_links(options.links, options.seed);
    warmup(interceptor, &links, settings);

    let mut timings = Vec::with_capacity(options.iterations);
    let mut downloads = 0usize;
    let total_start = Instant::now();

    for _ in 0..options.iterations {
        let start = Instant::now();
        for link in &links {
            if process_link(interceptor, link, settings) {
                downloads += 1;
            }
        }
        let elapsed_us = start.elapsed().as_secs_f64() * 1_000_000.0;
        timings.push(elapsed_us / links.len() as f64);
    }

    let total_secs = total_start.elapsed().as_secs_f64();
    let total_ops = (options.iterations * links.len()) as f64;

    timings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let avg_us = timings.iter().sum::<f64>() / timings.len() as f64;

    Ok(BenchResult {
        avg_us,
        p50_us: percentile(&timings, 0.50),
        p95_us: percentile(&timings, 0.95),
        p99_us: percentile(&timings, 0.99),
        ops_per_sec: if total_secs > 0.0 { total_ops / total_secs } else { 0.0 },
        download_pct: downloads as f64 / total_ops * 100.0,
    })
}

pub fn format_result(label: &str, result: &BenchResult) -> String {
    format!(
        "{}\n  avg: {:.3} us/link\n  p50: {:.3} us\n  p95: {:.3} us\n  p99: {:.3} us\n  ops/sec: {:.0}\n  downloads: {:.1}%",
        label,
        result.avg_us,
        result.p50_us,
        result.p95_us,
        result.p99_us,
        result.ops_per_sec,
        result.download_pct,
    )
}

#[cfg(test)]
mod tests {
    use xget_core::{InterceptorConfig, Registry};

    use super::*;

    #[test]
    fn test_generate_links_is_deterministic() {
        let a = generate_links(50, DEFAULT_SEED);
        let b = generate_links(50, DEFAULT_SEED);
        let a_urls: Vec<_> = a.iter().map(|l| l.url.as_str()).collect();
        let b_urls: Vec<_> = b.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(a_urls, b_urls);
        assert!(a.iter().all(|l| l.url.starts_with("https://")));
    }

    #[test]
    fn test_percentile() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.5), 2.0);
        assert_eq!(percentile(&values, 0.99), 4.0);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_run_bench_small() {
        let registry = Registry::builtin();
        let interceptor = Interceptor::new(&registry, InterceptorConfig::default());
        let options = BenchOptions {
            links: 20,
            iterations: 3,
            seed: 7,
        };
        let result = run_bench(&interceptor, &Settings::with_domain("m.example"), &options).unwrap();
        assert!(result.download_pct >= 0.0 && result.download_pct <= 100.0);
        assert!(result.p50_us <= result.p99_us);

        let zero = BenchOptions {
            links: 0,
            iterations: 1,
            seed: 7,
        };
        assert!(run_bench(&interceptor, &Settings::disabled(), &zero).is_err());
    }
}

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use stylo_ai::cli::{Cli, Commands};
use stylo_ai::config::{mask_secret, Config};
use stylo_ai::{server, uploads};
use stylo_ai_common::{detect_gaps, select_outfit, Occasion, OutfitItem, RecentlyWorn, StyleType, WardrobeItem};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Serve { port, data } => {
            if let Some(port) = port {
                config.port = port;
            }
            if data.is_some() {
                config.data_file = data;
            }
            server::init_tracing(cli.verbose);
            server::serve(config).await?;
        }

        Commands::Outfit { wardrobe, style, occasion, seed } => {
            println!("👗 stylo-ai - コーデ提案\n");

            let style = parse_named(&StyleType::ALL, StyleType::as_str, &style)
                .with_context(|| format!("不明なスタイル: {}", style))?;
            let occasion = occasion
                .map(|o| {
                    parse_named(&Occasion::ALL, Occasion::as_str, &o)
                        .with_context(|| format!("不明な着用シーン: {}", o))
                })
                .transpose()?;

            println!("[1/2] ワードローブを読み込み中...");
            let items = read_wardrobe(&wardrobe)?;
            println!("✔ {}点のアイテム\n", items.len());

            println!("[2/2] コーデを生成中... ({}{})", style, occasion.map(|o| format!(" / {}", o)).unwrap_or_default());
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let selection = select_outfit(&items, style, occasion, &RecentlyWorn::new(), &mut rng)?;

            let name_of = |item: &OutfitItem| describe(&items, item);
            for item in &selection.items {
                println!("  - {}", name_of(item));
            }
            if let Some(shoes) = &selection.shoes {
                println!("  - {}", name_of(shoes));
            }
            for accessory in &selection.accessories {
                println!("  - {}", name_of(accessory));
            }
            println!("  💇 {}", selection.hairstyle_suggestion);

            println!("\n{}", serde_json::to_string_pretty(&selection)?);
            println!("\n✅ 完了");
        }

        Commands::Gaps { wardrobe, occasion } => {
            println!("🔍 stylo-ai - 不足アイテム検出\n");

            let occasions = occasion
                .iter()
                .map(|o| {
                    parse_named(&Occasion::ALL, Occasion::as_str, o)
                        .with_context(|| format!("不明な着用シーン: {}", o))
                })
                .collect::<Result<Vec<_>>>()?;

            let items = read_wardrobe(&wardrobe)?;
            println!("✔ {}点のアイテム\n", items.len());

            let missing = detect_gaps(&items, &occasions);
            if missing.is_empty() {
                println!("不足しているアイテムはありません");
            } else {
                for gap in &missing {
                    println!(
                        "  [{:?}] {} ({}) - {}",
                        gap.priority, gap.item_name, gap.category, gap.description
                    );
                    if !gap.suggested_colors.is_empty() {
                        println!("        おすすめ色: {}", gap.suggested_colors.join(", "));
                    }
                }
            }

            println!("\n✅ {}件の不足を検出", missing.len());
        }

        Commands::Config { show, init } => {
            if init {
                let path = Config::config_path()?;
                if path.exists() {
                    bail!("設定ファイルは既に存在します: {}", path.display());
                }
                Config::default().save()?;
                println!("✔ 設定ファイルを作成: {}", path.display());
            }

            if show || !init {
                print_config(&config);
            }
        }

        Commands::Uploads { prune, dry_run } => {
            println!("🗂  stylo-ai - アップロード管理\n");

            let dir = config.upload_dir.clone();
            let stats = uploads::scan(&dir)?;
            println!("保存先: {}", dir.display());
            println!("✔ {}ファイル / {:.1} MB\n", stats.files, stats.bytes as f64 / (1024.0 * 1024.0));

            if prune || dry_run {
                let store = server::open_store(&config)?;
                let referenced = store.read(|db| db.referenced_uploads()).await;
                println!("参照中のファイル: {}件", referenced.len());

                let orphans = uploads::prune(&dir, &referenced, dry_run)?;
                for path in &orphans {
                    println!("  - {}", path.display());
                }
                if dry_run {
                    println!("\n✅ 削除対象: {}件（dry-run）", orphans.len());
                } else {
                    println!("\n✅ {}件を削除", orphans.len());
                }
            }
        }
    }

    Ok(())
}

fn read_wardrobe(path: &Path) -> Result<Vec<WardrobeItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("ワードローブを読み込めません: {}", path.display()))?;
    let items = serde_json::from_str(&content)
        .with_context(|| format!("ワードローブJSONが不正です: {}", path.display()))?;
    Ok(items)
}

/// 表示名の大文字小文字・ハイフンを無視して列挙値を探す
fn parse_named<T: Copy>(all: &[T], name: fn(&T) -> &'static str, input: &str) -> Option<T> {
    let wanted = input.trim().replace(['-', '_'], " ").to_lowercase();
    all.iter().copied().find(|v| name(v).to_lowercase() == wanted)
}

fn describe(items: &[WardrobeItem], item: &OutfitItem) -> String {
    match items.iter().find(|w| w.id == item.wardrobe_id) {
        Some(w) if !w.color.is_empty() => format!("{} ({}) {}", item.category, w.color, w.id),
        _ => format!("{} {}", item.category, item.wardrobe_id),
    }
}

fn print_config(config: &Config) {
    let path = Config::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "不明".into());
    let on_off = |b: bool| if b { "設定済み" } else { "未設定" };

    println!("⚙️  stylo-ai - 設定 ({})\n", path);
    println!("port:          {}", config.port);
    println!("jwt_secret:    {}", mask_secret(Some(&config.jwt_secret)));
    println!(
        "data_file:     {}",
        config.data_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "（メモリのみ）".into())
    );
    println!("upload_dir:    {}", config.upload_dir.display());
    println!("public_url:    {}", config.public_base_url());
    println!("frontend_url:  {}", config.frontend_url);
    println!("weather:       {}", mask_secret(config.weather.api_key.as_deref()));
    println!(
        "calendar:      {} (client_id {})",
        on_off(config.google_calendar.is_configured()),
        mask_secret(config.google_calendar.client_id.as_deref())
    );
    println!(
        "phonepe:       {} (merchant {})",
        on_off(config.phonepe.is_configured()),
        mask_secret(config.phonepe.merchant_id.as_deref())
    );
    println!("cloudinary:    {}", on_off(config.cloudinary.is_configured()));
    println!(
        "rekognition:   {} ({})",
        if config.rekognition.enabled { "有効" } else { "無効" },
        config.rekognition.region
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_is_lenient() {
        assert_eq!(
            parse_named(&StyleType::ALL, StyleType::as_str, "trend-aligned"),
            Some(StyleType::TrendAligned)
        );
        assert_eq!(
            parse_named(&Occasion::ALL, Occasion::as_str, " WEDDING "),
            Some(Occasion::Wedding)
        );
        assert_eq!(parse_named(&StyleType::ALL, StyleType::as_str, "professional"), None);
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stylo-ai")]
#[command(about = "StyloAI ワードローブ・コーデ提案サーバー", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// APIサーバーを起動
    Serve {
        /// 待ち受けポート（設定ファイル・PORT より優先）
        #[arg(short, long)]
        port: Option<u16>,

        /// データファイル（DATA_FILE より優先）
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// ワードローブJSONからコーデを1つ提案
    Outfit {
        /// ワードローブJSONファイル（WardrobeItem の配列）
        #[arg(required = true)]
        wardrobe: PathBuf,

        /// スタイル (casual/attractive/traditional/trend-aligned、大文字小文字は問わない)
        #[arg(short, long, default_value = "casual")]
        style: String,

        /// 着用シーン
        #[arg(short, long)]
        occasion: Option<String>,

        /// 乱数シード（同じ結果を再現する）
        #[arg(long)]
        seed: Option<u64>,
    },

    /// ワードローブJSONの不足アイテムを検出
    Gaps {
        /// ワードローブJSONファイル
        #[arg(required = true)]
        wardrobe: PathBuf,

        /// 着用シーン（複数指定可）
        #[arg(short, long)]
        occasion: Vec<String>,
    },

    /// 設定を表示・初期化
    Config {
        /// 現在の設定を表示（秘密値はマスク）
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを書き出す
        #[arg(long)]
        init: bool,
    },

    /// ローカル保存画像の統計・孤立ファイル削除
    Uploads {
        /// 参照されていないファイルを削除
        #[arg(long)]
        prune: bool,

        /// 削除せずに対象だけ表示
        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outfit_command() {
        let cli = Cli::try_parse_from([
            "stylo-ai", "outfit", "wardrobe.json", "-s", "traditional", "-o", "wedding", "--seed", "7",
        ])
        .unwrap();

        match cli.command {
            Commands::Outfit { wardrobe, style, occasion, seed } => {
                assert_eq!(wardrobe, PathBuf::from("wardrobe.json"));
                assert_eq!(style, "traditional");
                assert_eq!(occasion.as_deref(), Some("wedding"));
                assert_eq!(seed, Some(7));
            }
            _ => panic!("outfit コマンドとして解釈されない"),
        }
    }

    #[test]
    fn test_parse_gaps_multiple_occasions() {
        let cli = Cli::try_parse_from(["stylo-ai", "-v", "gaps", "w.json", "-o", "work", "-o", "party"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Gaps { occasion, .. } => assert_eq!(occasion, vec!["work", "party"]),
            _ => panic!("gaps コマンドとして解釈されない"),
        }
    }
}

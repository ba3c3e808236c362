//! StyloAI バックエンド
//!
//! ワードローブ管理・コーデ生成・プレミアム機能のREST APIと、
//! オフラインで使えるCLIを提供する。

pub mod auth;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
pub mod store;
pub mod uploads;

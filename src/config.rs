// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    common::stages::StageCatalog,
    db::{PgStore, Store},
    models::partner::PartnerStatus,
    services::{
        admin_service::AdminService,
        bitrix_client::BitrixClient,
        crm_gateway::CrmGateway,
        event_router::EventRouter,
        lead_service::LeadService,
        notifier::Notifier,
        sessions::SessionTable,
        telegram_client::TelegramClient,
        verification_service::VerificationService,
    },
};

// --- Funil de parceiros (verificação) ---
#[derive(Debug, Clone)]
pub struct PartnerFunnelConfig {
    pub funnel_id: String,
    pub tg_id_field: Option<String>,
    pub tg_username_field: Option<String>,
    pub role_field: Option<String>,
    pub verified_stage_id: String,
    pub rejected_stage_id: Option<String>,
    pub pending_stage_id: Option<String>,
}

impl PartnerFunnelConfig {
    /// Estágio do Bitrix para onde o negócio vai quando o status muda.
    pub fn stage_for(&self, status: PartnerStatus) -> Option<&str> {
        match status {
            PartnerStatus::Verified => Some(self.verified_stage_id.as_str()),
            PartnerStatus::Rejected => self.rejected_stage_id.as_deref(),
            PartnerStatus::Pending => self.pending_stage_id.as_deref(),
        }
    }

    /// Caminho inverso: ID de estágio recebido do CRM -> status local.
    pub fn status_for_stage(&self, stage_id: &str) -> Option<PartnerStatus> {
        [PartnerStatus::Verified, PartnerStatus::Rejected, PartnerStatus::Pending]
            .into_iter()
            .find(|status| self.stage_for(*status) == Some(stage_id))
    }
}

// --- Funil de clientes (leads) ---
#[derive(Debug, Clone)]
pub struct ClientFunnelConfig {
    pub funnel_id: String,
    pub start_stage_id: Option<String>,
    pub duplicate_stage_id: Option<String>,
    // Campo "Партнер" do negócio do cliente (referência pesquisável)
    pub partner_name_field: String,
    pub address_field: Option<String>,
    pub area_field: Option<String>,
    pub stages: StageCatalog,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bot_token: String,
    pub telegram_webhook_secret: Option<String>,
    pub web_server_port: u16,
    pub super_admin_id: i64,

    pub bitrix_partner_webhook: String,
    pub bitrix_client_webhook: String,
    pub bitrix_incoming_secret: String,
    pub bitrix_timeout: Duration,

    pub partner_funnel: PartnerFunnelConfig,
    pub client_funnel: ClientFunnelConfig,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{} deve ser definida", name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let super_admin_id = required("SUPER_ADMIN_ID")?
            .parse::<i64>()
            .context("SUPER_ADMIN_ID deve ser um número")?;

        let web_server_port = match optional("WEB_SERVER_PORT") {
            Some(port) => port.parse().context("WEB_SERVER_PORT inválida")?,
            None => 8080,
        };

        let bitrix_timeout = match optional("BITRIX_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(secs.parse().context("BITRIX_TIMEOUT_SECS inválida")?),
            None => Duration::from_secs(10),
        };

        let stages = StageCatalog::new(
            &required("BITRIX_CLIENT_STAGE_WIN")?,
            &required("BITRIX_CLIENT_STAGE_LOSE")?,
            optional("BITRIX_CLIENT_STAGE_MEETING").as_deref(),
        )
        .with_labels(&optional("BITRIX_CLIENT_STAGE_LABELS").unwrap_or_default());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bot_token: required("BOT_TOKEN")?,
            telegram_webhook_secret: optional("TELEGRAM_WEBHOOK_SECRET"),
            web_server_port,
            super_admin_id,

            bitrix_partner_webhook: required("BITRIX_PARTNER_WEBHOOK")?,
            bitrix_client_webhook: required("BITRIX_CLIENT_WEBHOOK")?,
            bitrix_incoming_secret: required("BITRIX_INCOMING_SECRET")?,
            bitrix_timeout,

            partner_funnel: PartnerFunnelConfig {
                funnel_id: required("PARTNER_FUNNEL_ID")?,
                tg_id_field: optional("PARTNER_DEAL_TG_ID_FIELD"),
                tg_username_field: optional("PARTNER_DEAL_TG_USERNAME_FIELD"),
                role_field: optional("PARTNER_ROLE_FIELD"),
                verified_stage_id: required("BITRIX_PARTNER_VERIFIED_STAGE_ID")?,
                rejected_stage_id: optional("BITRIX_PARTNER_REJECTED_STAGE_ID"),
                pending_stage_id: optional("BITRIX_PARTNER_PENDING_STAGE_ID"),
            },
            client_funnel: ClientFunnelConfig {
                funnel_id: required("BITRIX_CLIENT_FUNNEL_ID")?,
                start_stage_id: optional("BITRIX_CLIENT_START_STAGE_ID"),
                duplicate_stage_id: optional("BITRIX_CLIENT_DUPLICATE_STAGE_ID"),
                partner_name_field: required("PARTNER_DEAL_FIELD")?,
                address_field: optional("CLIENT_ADDRESS_DEAL_FIELD"),
                area_field: optional("CLIENT_AREA_FIELD"),
                stages,
            },
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub incoming_secret: String,
    pub telegram_secret: Option<String>,
    pub partner_funnel: PartnerFunnelConfig,
    pub admin_service: Arc<AdminService>,
    pub router: Arc<EventRouter>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let store: Arc<dyn Store> = Arc::new(PgStore::new(db_pool.clone()));
        let partner_crm: Arc<dyn CrmGateway> = Arc::new(BitrixClient::new(
            &config.bitrix_partner_webhook,
            config.bitrix_timeout,
        )?);
        let client_crm: Arc<dyn CrmGateway> = Arc::new(BitrixClient::new(
            &config.bitrix_client_webhook,
            config.bitrix_timeout,
        )?);
        let notifier: Arc<dyn Notifier> = Arc::new(TelegramClient::new(&config.bot_token)?);
        let sessions = Arc::new(SessionTable::default());

        let verification = Arc::new(VerificationService::new(
            store.clone(),
            partner_crm,
            notifier.clone(),
            config.partner_funnel.clone(),
        ));
        let leads = Arc::new(LeadService::new(
            store.clone(),
            client_crm,
            notifier.clone(),
            sessions.clone(),
            config.client_funnel.clone(),
        ));
        let admin_service = Arc::new(AdminService::new(
            store.clone(),
            notifier.clone(),
            config.super_admin_id,
        ));
        let router = Arc::new(EventRouter::new(
            store,
            notifier,
            sessions,
            verification,
            leads,
            admin_service.clone(),
        ));

        Ok(Self {
            db_pool,
            incoming_secret: config.bitrix_incoming_secret.clone(),
            telegram_secret: config.telegram_webhook_secret.clone(),
            partner_funnel: config.partner_funnel.clone(),
            admin_service,
            router,
        })
    }
}

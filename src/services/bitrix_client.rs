// src/services/bitrix_client.rs

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::services::crm_gateway::{parse_crm_id, CrmError, CrmGateway, DealFields, NewContact};

// Cliente do webhook de entrada do Bitrix24 (https://<portal>/rest/<user>/<token>/).
// Usamos uma instância por webhook: uma para o funil de parceiros, outra para o de clientes.
#[derive(Debug, Clone)]
pub struct BitrixClient {
    base_url: String,
    http: reqwest::Client,
}

impl BitrixClient {
    pub fn new(webhook_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base_url = webhook_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, http })
    }

    /// Chama `<method>.json` e devolve o campo `result`.
    async fn call<T: Serialize + ?Sized>(&self, method: &str, params: &T) -> Result<Value, CrmError> {
        let url = format!("{}{}.json", self.base_url, method);

        let response = self.http.post(&url).json(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrmError::Status {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        let mut body: Value = response.json().await?;
        match body.get_mut("result").map(Value::take) {
            Some(result) if !result.is_null() => Ok(result),
            _ => {
                tracing::warn!("Bitrix {} respondeu sem 'result': {}", method, body);
                Err(CrmError::MissingResult { method: method.to_string() })
            }
        }
    }

    fn expect_id(method: &str, result: &Value) -> Result<i64, CrmError> {
        parse_crm_id(result).ok_or_else(|| CrmError::MissingResult { method: method.to_string() })
    }
}

#[async_trait]
impl CrmGateway for BitrixClient {
    async fn create_contact(&self, contact: &NewContact) -> Result<i64, CrmError> {
        let mut fields = json!({
            "NAME": contact.name,
            "PHONE": [{ "VALUE": contact.phone, "VALUE_TYPE": "WORK" }],
        });
        if let Some(address) = &contact.address {
            fields["ADDRESS"] = json!(address);
        }

        let result = self.call("crm.contact.add", &json!({ "fields": fields })).await?;
        let id = Self::expect_id("crm.contact.add", &result)?;
        tracing::info!("Contato criado no Bitrix, ID: {}", id);
        Ok(id)
    }

    async fn create_deal(&self, fields: DealFields) -> Result<i64, CrmError> {
        let result = self.call("crm.deal.add", &json!({ "fields": fields })).await?;
        let id = Self::expect_id("crm.deal.add", &result)?;
        tracing::info!("Negócio criado no Bitrix, ID: {}", id);
        Ok(id)
    }

    async fn move_deal_stage(&self, deal_id: i64, stage_id: &str) -> bool {
        let params = json!({ "id": deal_id, "fields": { "STAGE_ID": stage_id } });

        match self.call("crm.deal.update", &params).await {
            Ok(_) => {
                tracing::info!("Negócio {} movido para o estágio {}.", deal_id, stage_id);
                true
            }
            Err(e) => {
                tracing::error!("Falha ao mover o negócio {} para {}: {}", deal_id, stage_id, e);
                false
            }
        }
    }

    async fn get_deal(&self, deal_id: i64) -> Result<DealFields, CrmError> {
        match self.call("crm.deal.get", &json!({ "id": deal_id })).await? {
            Value::Object(fields) => Ok(fields),
            _ => Err(CrmError::MissingResult { method: "crm.deal.get".to_string() }),
        }
    }

    async fn find_contact_by_phone(&self, phone: &str) -> Result<Option<i64>, CrmError> {
        let params = json!({
            "entity_type": "CONTACT",
            "type": "PHONE",
            "values": [phone],
        });

        // Sem duplicata o Bitrix devolve `[]`; com duplicata, `{"CONTACT": [ids]}`
        let result = self.call("crm.duplicate.findbycomm", &params).await?;
        Ok(result
            .get("CONTACT")
            .and_then(Value::as_array)
            .and_then(|ids| ids.iter().find_map(parse_crm_id)))
    }
}

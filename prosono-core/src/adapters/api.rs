//! ProSono API client
//!
//! Handles all communication with the ProSono backend: credential exchange,
//! profile reads and updates, and survey submissions. Every request attaches
//! the stored access token as a bearer credential; when the token's embedded
//! expiry claim has passed and a refresh token is on hand, the client runs a
//! refresh round trip first, transparently to the caller.
//!
//! Non-success responses are normalized to `Error::Api { message, status }`
//! by parsing the body best-effort, so callers can branch on status codes
//! without touching transport details.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{
    AttitudeAnswers, FrequencyAnswers, KnowledgeAnswers, LoginCredentials, RegisterData, User,
    UserUpdate,
};
use crate::ports::TokenStore;

// =============================================================================
// Auth wire models
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "tokenType")]
    pub token_type: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

/// Refresh response; the rotated refresh token is optional per response
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

// =============================================================================
// Survey wire models (field names fixed by the backend)
// =============================================================================

/// New evaluation survey record identifier
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SurveyCreated {
    pub id: i64,
}

/// "My sleep" attitude payload for POST /my-sleep-surveys
#[derive(Debug, Clone, Serialize)]
pub struct AttitudeSurveyPayload {
    #[serde(rename = "durmoMalOuBem")]
    pub sleep_well_or_poorly: u8,
    #[serde(rename = "gostoDeDormir")]
    pub enjoy_sleeping: u8,
    #[serde(rename = "achoSonoImportanteParaMim")]
    pub sleep_is_important: u8,
    #[serde(rename = "oQueSeiSobreSono")]
    pub sleep_self_knowledge: u8,
    #[serde(rename = "surveyDate")]
    pub survey_date: String,
}

impl AttitudeSurveyPayload {
    pub fn new(answers: &AttitudeAnswers, wire_date: &str) -> Self {
        Self {
            sleep_well_or_poorly: answers.sleep_well_or_poorly,
            enjoy_sleeping: answers.enjoy_sleeping,
            sleep_is_important: answers.sleep_is_important,
            sleep_self_knowledge: answers.sleep_self_knowledge,
            survey_date: wire_date.to_string(),
        }
    }
}

/// Daytime-sleepiness (Cleveland) payload for POST /cleveland-surveys
#[derive(Debug, Clone, Serialize)]
pub struct FrequencySurveyPayload {
    #[serde(rename = "adormecoduranteAulasManha")]
    pub doze_in_morning_classes: u8,
    #[serde(rename = "consigoAguentarDiaInteiroEscolaSemCansaco")]
    pub last_school_day_without_fatigue: u8,
    #[serde(rename = "adormecoUltimaAulaDia")]
    pub doze_in_last_class: u8,
    #[serde(rename = "ficoSonolentoCarroMais5Minutos")]
    pub drowsy_in_car_five_minutes: u8,
    #[serde(rename = "ficoBemAcordadoDuranteTodoDia")]
    pub wide_awake_all_day: u8,
    #[serde(rename = "adormecoEscolaAulasTarde")]
    pub doze_in_afternoon_classes: u8,
    #[serde(rename = "sintoMeDespertoDuranteAulas")]
    pub alert_during_classes: u8,
    #[serde(rename = "sintoMeSonolentoFimDiaDepoisAulas")]
    pub drowsy_after_school_day: u8,
    #[serde(rename = "sintoMeSonolentoAutocarroAtividadeEscola")]
    pub drowsy_on_bus_to_activity: u8,
    #[serde(rename = "deManhaQuandoEstouEscolaAdormeco")]
    pub doze_at_school_mornings: u8,
    #[serde(rename = "quandoEstouAulasSintoMeBemDesperto")]
    pub alert_in_classes: u8,
    #[serde(rename = "sintoMeSonolentoTrabalhosCasaNoiteEscola")]
    pub drowsy_during_evening_homework: u8,
    #[serde(rename = "estouBemDespertoUltimaAulaDia")]
    pub alert_in_last_class: u8,
    #[serde(rename = "adormecoQuandoAndoCarroAutocarroComboio")]
    pub doze_on_transport: u8,
    #[serde(rename = "duranteDiaEscolaMomentosAcabeiAdormecer")]
    pub dozed_off_at_school: u8,
    #[serde(rename = "adormecoQuandoFacoTrabalhosEscolaNoiteCasa")]
    pub doze_during_evening_homework: u8,
    #[serde(rename = "surveyDate")]
    pub survey_date: String,
}

impl FrequencySurveyPayload {
    pub fn new(answers: &FrequencyAnswers, wire_date: &str) -> Self {
        Self {
            doze_in_morning_classes: answers.doze_in_morning_classes,
            last_school_day_without_fatigue: answers.last_school_day_without_fatigue,
            doze_in_last_class: answers.doze_in_last_class,
            drowsy_in_car_five_minutes: answers.drowsy_in_car_five_minutes,
            wide_awake_all_day: answers.wide_awake_all_day,
            doze_in_afternoon_classes: answers.doze_in_afternoon_classes,
            alert_during_classes: answers.alert_during_classes,
            drowsy_after_school_day: answers.drowsy_after_school_day,
            drowsy_on_bus_to_activity: answers.drowsy_on_bus_to_activity,
            doze_at_school_mornings: answers.doze_at_school_mornings,
            alert_in_classes: answers.alert_in_classes,
            drowsy_during_evening_homework: answers.drowsy_during_evening_homework,
            alert_in_last_class: answers.alert_in_last_class,
            doze_on_transport: answers.doze_on_transport,
            dozed_off_at_school: answers.dozed_off_at_school,
            doze_during_evening_homework: answers.doze_during_evening_homework,
            survey_date: wire_date.to_string(),
        }
    }
}

/// Sleep-knowledge payload for POST /surveys
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeSurveyPayload {
    #[serde(rename = "dormirPoucoAgressivoIrritadico")]
    pub short_sleep_causes_irritability: bool,
    #[serde(rename = "adormecerAumentaTemperaturaCorpo")]
    pub falling_asleep_raises_body_temperature: bool,
    #[serde(rename = "horaDormirNaoInfluenciaQualidadeSono")]
    pub bedtime_does_not_affect_quality: bool,
    #[serde(rename = "computadorNoitePrejudicaSono")]
    pub evening_computer_harms_sleep: bool,
    #[serde(rename = "adolescentesDevemDormir8Horas")]
    pub teens_need_eight_hours: bool,
    #[serde(rename = "concentracaoIndependenteDoSono")]
    pub concentration_independent_of_sleep: bool,
    #[serde(rename = "dormirSemAtividadeCerebral")]
    pub sleep_without_brain_activity: bool,
    #[serde(rename = "indiferenteDormirDiaOuNoite")]
    pub day_or_night_sleep_equivalent: bool,
    #[serde(rename = "comerMuitoAntesPrejudicaSono")]
    pub heavy_meals_harm_sleep: bool,
    #[serde(rename = "mensagensNoitePrejudicaSono")]
    pub night_messaging_harms_sleep: bool,
    #[serde(rename = "dormirPoucoAumentaDoencas")]
    pub short_sleep_increases_illness: bool,
    #[serde(rename = "estudarTardeIgualEficazDia")]
    pub late_study_as_effective_as_daytime: bool,
    #[serde(rename = "muitaLuzNoiteAlteraRitmo")]
    pub bright_light_alters_rhythm: bool,
    #[serde(rename = "esforcoFisicoAjudaAdormecer")]
    pub exercise_helps_falling_asleep: bool,
    #[serde(rename = "compensarSonoPerdidoNoiteSeguinte")]
    pub lost_sleep_recovered_next_night: bool,
    #[serde(rename = "sonoInsuficienteEngordar")]
    pub insufficient_sleep_causes_weight_gain: bool,
    #[serde(rename = "sestaNaoAfetaSonoNoite")]
    pub naps_do_not_affect_night_sleep: bool,
    #[serde(rename = "luzSolAjudaDormirBem")]
    pub sunlight_helps_sleep: bool,
    #[serde(rename = "dormirPoucoAumentaAcidentes")]
    pub short_sleep_increases_accidents: bool,
    #[serde(rename = "variosTiposSonoNoite")]
    pub several_sleep_stages_per_night: bool,
    #[serde(rename = "surveyDate")]
    pub survey_date: String,
}

impl KnowledgeSurveyPayload {
    pub fn new(answers: &KnowledgeAnswers, wire_date: &str) -> Self {
        Self {
            short_sleep_causes_irritability: answers.short_sleep_causes_irritability,
            falling_asleep_raises_body_temperature: answers.falling_asleep_raises_body_temperature,
            bedtime_does_not_affect_quality: answers.bedtime_does_not_affect_quality,
            evening_computer_harms_sleep: answers.evening_computer_harms_sleep,
            teens_need_eight_hours: answers.teens_need_eight_hours,
            concentration_independent_of_sleep: answers.concentration_independent_of_sleep,
            sleep_without_brain_activity: answers.sleep_without_brain_activity,
            day_or_night_sleep_equivalent: answers.day_or_night_sleep_equivalent,
            heavy_meals_harm_sleep: answers.heavy_meals_harm_sleep,
            night_messaging_harms_sleep: answers.night_messaging_harms_sleep,
            short_sleep_increases_illness: answers.short_sleep_increases_illness,
            late_study_as_effective_as_daytime: answers.late_study_as_effective_as_daytime,
            bright_light_alters_rhythm: answers.bright_light_alters_rhythm,
            exercise_helps_falling_asleep: answers.exercise_helps_falling_asleep,
            lost_sleep_recovered_next_night: answers.lost_sleep_recovered_next_night,
            insufficient_sleep_causes_weight_gain: answers.insufficient_sleep_causes_weight_gain,
            naps_do_not_affect_night_sleep: answers.naps_do_not_affect_night_sleep,
            sunlight_helps_sleep: answers.sunlight_helps_sleep,
            short_sleep_increases_accidents: answers.short_sleep_increases_accidents,
            several_sleep_stages_per_night: answers.several_sleep_stages_per_night,
            survey_date: wire_date.to_string(),
        }
    }
}

/// Nightly-log payload for POST /daily-surveys
///
/// `note` is omitted entirely when absent rather than sent as an empty string.
#[derive(Debug, Clone, Serialize)]
pub struct DailySurveyPayload {
    #[serde(rename = "horaLevantasteHoje")]
    pub wake_time: String,
    #[serde(rename = "horaDeitasteOntem")]
    pub bedtime: String,
    #[serde(rename = "tempoAteAdormecer")]
    pub minutes_to_fall_asleep: u32,
    #[serde(rename = "vezesAcordasteNoite")]
    pub night_awakenings: u32,
    /// Total minutes of sleep
    #[serde(rename = "horasQueDormiste")]
    pub total_sleep_minutes: u32,
    #[serde(rename = "qualidadeSonoNoite")]
    pub sleep_quality: u8,
    #[serde(rename = "observacaoNoitePassada", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "surveyDate")]
    pub survey_date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailySurveyCreated {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Stored nightly log, as returned by GET /daily-surveys
#[derive(Debug, Clone, Deserialize)]
pub struct DailySurveyRecord {
    pub id: i64,
    #[serde(rename = "horaLevantasteHoje")]
    pub wake_time: String,
    #[serde(rename = "horaDeitasteOntem")]
    pub bedtime: String,
    #[serde(rename = "tempoAteAdormecer")]
    pub minutes_to_fall_asleep: u32,
    #[serde(rename = "vezesAcordasteNoite")]
    pub night_awakenings: u32,
    #[serde(rename = "horasQueDormiste")]
    pub total_sleep_minutes: u32,
    #[serde(rename = "qualidadeSonoNoite")]
    pub sleep_quality: u8,
    #[serde(rename = "observacaoNoitePassada", default)]
    pub note: Option<String>,
    #[serde(rename = "surveyDate")]
    pub survey_date: String,
}

// =============================================================================
// Token expiry heuristic
// =============================================================================

/// Classify an access token as expired from its embedded `exp` claim.
///
/// The payload is decoded without any signature check - this is a client-side
/// heuristic to decide when a refresh is worth attempting, never a substitute
/// for server-side verification, and no clock-skew allowance is applied.
/// Malformed tokens (wrong segment count, undecodable or unparsable payload,
/// missing claim) are classified expired.
pub fn token_is_expired(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return true;
    }

    let payload = match URL_SAFE_NO_PAD.decode(parts[1]) {
        Ok(bytes) => bytes,
        Err(_) => return true,
    };
    let claims: serde_json::Value = match serde_json::from_slice(&payload) {
        Ok(value) => value,
        Err(_) => return true,
    };

    match claims.get("exp").and_then(|exp| exp.as_i64()) {
        Some(exp) => exp < Utc::now().timestamp(),
        None => true,
    }
}

// =============================================================================
// ProSono HTTP client
// =============================================================================

pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Refresh the access token before a request would go out with an expired
    /// credential.
    ///
    /// Runs only when an access token is stored, its expiry claim has passed
    /// and a refresh token exists. A failed exchange is a hard session
    /// termination: both tokens are cleared and the caller gets
    /// `Error::SessionExpired`, not a recoverable error.
    async fn refresh_if_expired(&self) -> Result<()> {
        let (access, refresh) = match (self.store.access_token(), self.store.refresh_token()) {
            (Some(access), Some(refresh)) => (access, refresh),
            _ => return Ok(()),
        };
        if !token_is_expired(&access) {
            return Ok(());
        }

        let url = format!("{}/auth/refresh", self.base_url);
        let outcome = self
            .http
            .post(&url)
            .json(&RefreshRequest {
                refresh_token: refresh,
            })
            .send()
            .await;

        match outcome {
            Ok(response) if response.status().is_success() => {
                match response.json::<RefreshResponse>().await {
                    Ok(body) => {
                        self.store
                            .set_token_pair(&body.token, body.refresh_token.as_deref());
                        Ok(())
                    }
                    Err(_) => {
                        self.store.clear();
                        Err(Error::SessionExpired(
                            "token refresh returned an unreadable response".to_string(),
                        ))
                    }
                }
            }
            _ => {
                self.store.clear();
                Err(Error::SessionExpired(
                    "token refresh failed, please log in again".to_string(),
                ))
            }
        }
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        self.refresh_if_expired().await?;

        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.http.request(method, &url);
        if let Some(token) = self.store.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            // Parse the error body best-effort; an empty object falls back to
            // the generic message.
            let body: serde_json::Value = response
                .json()
                .await
                .unwrap_or_else(|_| serde_json::json!({}));
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("An error occurred")
                .to_string();
            return Err(Error::Api {
                message,
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.execute::<()>(Method::GET, endpoint, None).await?;
        parse_body(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.execute(Method::POST, endpoint, Some(body)).await?;
        parse_body(response).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.execute(Method::PUT, endpoint, Some(body)).await?;
        parse_body(response).await
    }

    // -------------------------------------------------------------------------
    // Auth endpoints
    // -------------------------------------------------------------------------

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse> {
        self.post("/auth/login", credentials).await
    }

    /// Register a new account; success carries no meaningful body
    pub async fn register(&self, data: &RegisterData) -> Result<()> {
        self.execute(Method::POST, "/auth/register", Some(data))
            .await?;
        Ok(())
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse> {
        self.post(
            "/auth/refresh",
            &RefreshRequest {
                refresh_token: refresh_token.to_string(),
            },
        )
        .await
    }

    pub async fn logout(&self) -> Result<()> {
        self.execute::<()>(Method::POST, "/auth/logout", None)
            .await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // User endpoints
    // -------------------------------------------------------------------------

    pub async fn current_user(&self) -> Result<User> {
        self.get("/user").await
    }

    pub async fn update_user(&self, update: &UserUpdate) -> Result<User> {
        self.put("/user", update).await
    }

    // -------------------------------------------------------------------------
    // Survey endpoints
    // -------------------------------------------------------------------------

    pub async fn submit_attitude_survey(
        &self,
        payload: &AttitudeSurveyPayload,
    ) -> Result<SurveyCreated> {
        self.post("/my-sleep-surveys", payload).await
    }

    pub async fn submit_frequency_survey(
        &self,
        payload: &FrequencySurveyPayload,
    ) -> Result<SurveyCreated> {
        self.post("/cleveland-surveys", payload).await
    }

    pub async fn submit_knowledge_survey(
        &self,
        payload: &KnowledgeSurveyPayload,
    ) -> Result<SurveyCreated> {
        self.post("/surveys", payload).await
    }

    pub async fn submit_daily_survey(
        &self,
        payload: &DailySurveyPayload,
    ) -> Result<DailySurveyCreated> {
        self.post("/daily-surveys", payload).await
    }

    /// Latest nightly log; a 404 means none exists yet
    pub async fn latest_daily_survey(&self) -> Result<Option<DailySurveyRecord>> {
        match self.get::<DailySurveyRecord>("/daily-surveys").await {
            Ok(record) => Ok(Some(record)),
            Err(Error::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| Error::Transport(format!("Failed to parse response body: {e}")))
}

/// Map request errors to user-friendly messages
fn map_transport_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Transport("Connection timed out".to_string())
    } else if error.is_connect() {
        Error::Transport("Unable to reach the ProSono server".to_string())
    } else {
        Error::Transport(format!("Request failed: {error}"))
    }
}

// =============================================================================
// Tests
// =============================================================================

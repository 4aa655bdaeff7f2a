//! Pre-flight validation of desired configuration.
//!
//! Every check is a pure function of the configuration. Union exclusivity is
//! checked first and short-circuits: with zero or several variants selected
//! no variant-specific rule is meaningful. Every other rule is collected.

use crate::config::{ContactConfig, MonitorConfig, StatusPageConfig};
use crate::settings::{
    ContactChannel, IncidentIoSettings, OpsgenieSettings, PagerDutySettings, ZendeskSettings,
};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::Url;
use validator::ValidateEmail;

/// Hosted domain suffix custom domains may not use.
pub const RESERVED_DOMAIN_SUFFIX: &str = "uptime-monitor.io";

const SLACK_PREFIX: &str = "https://hooks.slack.com/";
const DISCORD_PREFIXES: [&str; 2] = [
    "https://discord.com/api/webhooks/",
    "https://discordapp.com/api/webhooks/",
];
const PAGERDUTY_KEY_LEN: usize = 32;
const PAGERDUTY_SEVERITIES: [&str; 4] = ["critical", "error", "warning", "info"];
const OPSGENIE_PRIORITIES: [&str; 5] = ["P1", "P2", "P3", "P4", "P5"];
const OPSGENIE_RESPONDER_TYPES: [&str; 4] = ["team", "user", "escalation", "schedule"];
const ZENDESK_PRIORITIES: [&str; 4] = ["low", "normal", "high", "urgent"];
const STATUS_PAGE_PERIODS: [i64; 3] = [7, 30, 90];
const STATUS_PAGE_NAME_MAX: usize = 100;
const STATUS_PAGE_MONITORS_MAX: usize = 20;

static E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("valid regex"));
static ZENDESK_SUBDOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").expect("valid regex"));
static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9][a-zA-Z0-9-]{0,61}[a-zA-Z0-9]?(\.[a-zA-Z0-9][a-zA-Z0-9-]{0,61}[a-zA-Z0-9]?)*$",
    )
    .expect("valid regex")
});
static BASIC_AUTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^:]+:[^:]+$").expect("valid regex"));

/// Stable category of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    /// No variant block populated.
    MissingVariant,
    /// More than one variant block populated.
    AmbiguousVariant,
    /// A required field is absent or empty.
    Required,
    /// A field does not match its expected syntax.
    InvalidFormat,
    /// A field is not one of its allowed values.
    InvalidChoice,
    /// A number or length is out of bounds.
    OutOfRange,
    /// A value uses something reserved by the service.
    Reserved,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingVariant => "missing_variant",
            Self::AmbiguousVariant => "ambiguous_variant",
            Self::Required => "required",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidChoice => "invalid_choice",
            Self::OutOfRange => "out_of_range",
            Self::Reserved => "reserved",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found in a desired configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub code: IssueCode,
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable explanation.
    pub detail: String,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code,
            field: field.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.field, self.detail, self.code)
    }
}

/// Collects issues for one configuration.
#[derive(Debug, Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, code: IssueCode, field: impl Into<String>, detail: impl Into<String>) {
        self.0.push(ValidationIssue::new(code, field, detail));
    }

    /// Push a `Required` issue if `value` is empty. Returns whether it was present.
    fn require(&mut self, field: &str, value: &str, detail: &str) -> bool {
        if value.trim().is_empty() {
            self.push(IssueCode::Required, field, detail);
            false
        } else {
            true
        }
    }
}

fn check_union(
    issues: &mut Issues,
    populated: &[&str],
    field: &str,
    missing: &str,
    ambiguous: &str,
) -> bool {
    match populated.len() {
        1 => true,
        0 => {
            issues.push(IssueCode::MissingVariant, field, missing);
            false
        }
        _ => {
            issues.push(
                IssueCode::AmbiguousVariant,
                field,
                format!("{ambiguous}, got: {}", populated.join(", ")),
            );
            false
        }
    }
}

/// Validate a desired monitor.
pub fn validate_monitor(config: &MonitorConfig) -> Vec<ValidationIssue> {
    let mut issues = Issues::default();
    if !check_union(
        &mut issues,
        &config.populated_variants(),
        "monitor type",
        "At least one monitor type must be configured (https, tcp, or ping)",
        "Only one monitor type can be configured per monitor",
    ) {
        return issues.0;
    }

    issues.require("name", &config.name, "Name is required");

    if let Some(interval) = config.check_interval
        && interval < 1
    {
        issues.push(
            IssueCode::OutOfRange,
            "check_interval",
            format!("check_interval must be at least 1 second, got {interval}"),
        );
    }
    if let Some(timeout) = config.timeout
        && timeout < 1
    {
        issues.push(
            IssueCode::OutOfRange,
            "timeout",
            format!("timeout must be at least 1 second, got {timeout}"),
        );
    }

    let threshold = config.effective_fail_threshold();
    if threshold < 1 {
        issues.push(
            IssueCode::OutOfRange,
            "fail_threshold",
            format!("fail_threshold must be at least 1, got {threshold}"),
        );
    }
    if let Some(regions) = config.regions.as_ref().filter(|r| !r.is_empty())
        && threshold > regions.len() as i64
    {
        issues.push(
            IssueCode::OutOfRange,
            "fail_threshold",
            format!(
                "fail_threshold ({threshold}) cannot exceed the number of regions ({})",
                regions.len()
            ),
        );
    }

    if let Some(port) = config.port
        && !(1..=65535).contains(&port)
    {
        issues.push(
            IssueCode::OutOfRange,
            "port",
            format!("port must be between 1 and 65535, got {port}"),
        );
    }

    if let Some(https) = &config.https
        && issues.require("https.url", &https.url, "URL is required for https monitors")
    {
        match Url::parse(&https.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => issues.push(
                IssueCode::InvalidFormat,
                "https.url",
                format!("Monitor URL must use HTTP or HTTPS scheme, got: {}", url.scheme()),
            ),
            Err(_) => issues.push(
                IssueCode::InvalidFormat,
                "https.url",
                format!("Invalid URL format: {}", https.url),
            ),
        }
    }
    if let Some(tcp) = &config.tcp {
        issues.require("tcp.url", &tcp.url, "URL is required for tcp monitors");
    }
    if let Some(ping) = &config.ping {
        issues.require("ping.url", &ping.url, "URL is required for ping monitors");
    }

    issues.0
}

/// Validate a desired contact.
pub fn validate_contact(config: &ContactConfig) -> Vec<ValidationIssue> {
    let mut issues = Issues::default();
    if !check_union(
        &mut issues,
        &config.populated_variants(),
        "channel",
        "At least one channel type must be configured (email, sms, webhook, slack, discord, pagerduty, incidentio, opsgenie, or zendesk)",
        "Only one channel type can be configured per contact",
    ) {
        return issues.0;
    }

    issues.require("name", &config.name, "Name is required");

    if let Some(channel) = config.channel() {
        validate_channel(&mut issues, &channel);
    }
    issues.0
}

fn validate_channel(issues: &mut Issues, channel: &ContactChannel) {
    match channel {
        ContactChannel::Email(s) => {
            if issues.require("email.email", &s.email, "Email address is required for email contacts") {
                check_email(issues, "email.email", &s.email);
            }
        }
        ContactChannel::Sms(s) => {
            if issues.require("sms.phone", &s.phone, "Phone number is required for SMS contacts")
                && !E164.is_match(&s.phone)
            {
                issues.push(
                    IssueCode::InvalidFormat,
                    "sms.phone",
                    format!(
                        "Phone number must be in E.164 format (e.g., +1234567890): {}",
                        s.phone
                    ),
                );
            }
        }
        ContactChannel::Webhook(s) => {
            if issues.require("webhook.url", &s.url, "URL is required for webhook contacts") {
                match Url::parse(&s.url) {
                    Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                    Ok(url) => issues.push(
                        IssueCode::InvalidFormat,
                        "webhook.url",
                        format!(
                            "Webhook URL must use HTTP or HTTPS scheme, got: {}",
                            url.scheme()
                        ),
                    ),
                    Err(_) => issues.push(
                        IssueCode::InvalidFormat,
                        "webhook.url",
                        format!("Invalid URL format: {}", s.url),
                    ),
                }
            }
        }
        ContactChannel::Slack(s) => {
            if issues.require(
                "slack.webhook_url",
                &s.webhook_url,
                "Webhook URL is required for Slack contacts",
            ) && !s.webhook_url.starts_with(SLACK_PREFIX)
            {
                issues.push(
                    IssueCode::InvalidFormat,
                    "slack.webhook_url",
                    format!(
                        "Slack webhook URL must start with '{SLACK_PREFIX}', got: {}",
                        s.webhook_url
                    ),
                );
            }
        }
        ContactChannel::Discord(s) => {
            if issues.require(
                "discord.webhook_url",
                &s.webhook_url,
                "Webhook URL is required for Discord contacts",
            ) && !DISCORD_PREFIXES.iter().any(|p| s.webhook_url.starts_with(p))
            {
                issues.push(
                    IssueCode::InvalidFormat,
                    "discord.webhook_url",
                    format!(
                        "Discord webhook URL must start with '{}' or '{}', got: {}",
                        DISCORD_PREFIXES[0], DISCORD_PREFIXES[1], s.webhook_url
                    ),
                );
            }
        }
        ContactChannel::PagerDuty(s) => validate_pagerduty(issues, s),
        ContactChannel::IncidentIo(s) => validate_incidentio(issues, s),
        ContactChannel::Opsgenie(s) => validate_opsgenie(issues, s),
        ContactChannel::Zendesk(s) => validate_zendesk(issues, s),
    }
}

fn validate_pagerduty(issues: &mut Issues, s: &PagerDutySettings) {
    if !issues.require(
        "pagerduty.integration_key",
        &s.integration_key,
        "Integration key is required for PagerDuty contacts",
    ) {
        return;
    }
    let len = s.integration_key.chars().count();
    if len != PAGERDUTY_KEY_LEN {
        issues.push(
            IssueCode::InvalidFormat,
            "pagerduty.integration_key",
            format!(
                "PagerDuty integration key must be exactly {PAGERDUTY_KEY_LEN} characters, got {len} characters"
            ),
        );
    }
    if let Some(mapping) = &s.severity_mapping {
        for (priority, severity) in mapping.entries() {
            if !severity.is_empty() && !PAGERDUTY_SEVERITIES.contains(&severity) {
                issues.push(
                    IssueCode::InvalidChoice,
                    format!("pagerduty.severity_mapping.{priority}"),
                    format!(
                        "Invalid severity '{severity}' for {priority} priority. Must be one of: {}",
                        PAGERDUTY_SEVERITIES.join(", ")
                    ),
                );
            }
        }
    }
}

fn validate_incidentio(issues: &mut Issues, s: &IncidentIoSettings) {
    let has_url = issues.require(
        "incidentio.webhook_url",
        &s.webhook_url,
        "Webhook URL is required for Incident.io contacts",
    );
    let has_token = issues.require(
        "incidentio.bearer_token",
        &s.bearer_token,
        "Bearer token is required for Incident.io contacts",
    );
    if !(has_url && has_token) {
        return;
    }
    match Url::parse(&s.webhook_url) {
        Ok(url) if url.scheme() == "https" => {}
        Ok(_) => issues.push(
            IssueCode::InvalidFormat,
            "incidentio.webhook_url",
            "Incident.io webhook URL must use HTTPS",
        ),
        Err(_) => issues.push(
            IssueCode::InvalidFormat,
            "incidentio.webhook_url",
            format!("Invalid URL format: {}", s.webhook_url),
        ),
    }
}

fn validate_opsgenie(issues: &mut Issues, s: &OpsgenieSettings) {
    if !issues.require("opsgenie.api_key", &s.api_key, "API key is required for Opsgenie contacts") {
        return;
    }
    if let Some(priority) = s.priority.as_deref().filter(|p| !p.is_empty())
        && !OPSGENIE_PRIORITIES.contains(&priority)
    {
        issues.push(
            IssueCode::InvalidChoice,
            "opsgenie.priority",
            format!(
                "Priority must be one of: {}. Got: {priority}",
                OPSGENIE_PRIORITIES.join(", ")
            ),
        );
    }
    for (index, responder) in s.responders.iter().flatten().enumerate() {
        let field = format!("opsgenie.responders[{index}]");
        if responder.kind.is_empty() {
            issues.push(
                IssueCode::Required,
                format!("{field}.type"),
                format!("Responder at index {index} must have a type"),
            );
            continue;
        }
        if !OPSGENIE_RESPONDER_TYPES.contains(&responder.kind.as_str()) {
            issues.push(
                IssueCode::InvalidChoice,
                format!("{field}.type"),
                format!(
                    "Responder type at index {index} must be one of: {}. Got: {}",
                    OPSGENIE_RESPONDER_TYPES.join(", "),
                    responder.kind
                ),
            );
            continue;
        }
        let has_identifier = [&responder.id, &responder.name, &responder.username]
            .into_iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.is_empty()));
        if !has_identifier {
            issues.push(
                IssueCode::Required,
                field,
                format!("Responder at index {index} must have at least one of: id, name, or username"),
            );
        }
    }
}

fn validate_zendesk(issues: &mut Issues, s: &ZendeskSettings) {
    let present = [
        issues.require("zendesk.subdomain", &s.subdomain, "Subdomain is required for Zendesk contacts"),
        issues.require("zendesk.email", &s.email, "Email is required for Zendesk contacts"),
        issues.require("zendesk.api_token", &s.api_token, "API token is required for Zendesk contacts"),
    ];
    if present.contains(&false) {
        return;
    }
    check_email(issues, "zendesk.email", &s.email);
    if !ZENDESK_SUBDOMAIN.is_match(&s.subdomain) {
        issues.push(
            IssueCode::InvalidFormat,
            "zendesk.subdomain",
            format!(
                "Subdomain must contain only lowercase letters, numbers, and hyphens: {}",
                s.subdomain
            ),
        );
    }
    if let Some(priority) = s.priority.as_deref().filter(|p| !p.is_empty())
        && !ZENDESK_PRIORITIES.contains(&priority)
    {
        issues.push(
            IssueCode::InvalidChoice,
            "zendesk.priority",
            format!(
                "Priority must be one of: {}. Got: {priority}",
                ZENDESK_PRIORITIES.join(", ")
            ),
        );
    }
}

/// Accepts `addr-spec` and `Display Name <addr-spec>`.
fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    let address = match (value.rfind('<'), value.strip_suffix('>')) {
        (Some(open), Some(inner)) => &inner[open + 1..],
        (None, None) => value,
        _ => return false,
    };
    address.validate_email()
}

fn check_email(issues: &mut Issues, field: &str, value: &str) {
    if !is_valid_email(value) {
        issues.push(
            IssueCode::InvalidFormat,
            field,
            format!("Invalid email address format: {value}"),
        );
    }
}

/// Validate a desired status page.
pub fn validate_status_page(config: &StatusPageConfig) -> Vec<ValidationIssue> {
    let mut issues = Issues::default();

    let name_len = config.name.chars().count();
    if name_len == 0 {
        issues.push(IssueCode::Required, "name", "Name is required");
    } else if name_len > STATUS_PAGE_NAME_MAX {
        issues.push(
            IssueCode::OutOfRange,
            "name",
            format!("Name must be at most {STATUS_PAGE_NAME_MAX} characters, got {name_len}"),
        );
    }

    match config.monitors.len() {
        0 => issues.push(
            IssueCode::Required,
            "monitors",
            "At least one monitor is required",
        ),
        n if n > STATUS_PAGE_MONITORS_MAX => issues.push(
            IssueCode::OutOfRange,
            "monitors",
            format!("At most {STATUS_PAGE_MONITORS_MAX} monitors are allowed, got {n}"),
        ),
        _ => {}
    }
    if config.monitors.iter().any(|m| m.trim().is_empty()) {
        issues.push(IssueCode::Required, "monitors", "Monitor ids cannot be empty");
    }

    let period = config.effective_period();
    if !STATUS_PAGE_PERIODS.contains(&period) {
        issues.push(
            IssueCode::InvalidChoice,
            "period",
            format!("period must be one of: 7, 30, 90. Got: {period}"),
        );
    }

    if let Some(domain) = config.custom_domain.as_deref().filter(|d| !d.is_empty()) {
        check_custom_domain(&mut issues, domain);
    }

    if let Some(auth) = config.basic_auth.as_deref().filter(|a| !a.is_empty())
        && !BASIC_AUTH.is_match(auth)
    {
        issues.push(
            IssueCode::InvalidFormat,
            "basic_auth",
            "basic_auth must be in 'username:password' format",
        );
    }

    issues.0
}

fn check_custom_domain(issues: &mut Issues, domain: &str) {
    const FIELD: &str = "custom_domain";
    if domain.contains('/') {
        issues.push(
            IssueCode::InvalidFormat,
            FIELD,
            "custom domain cannot contain forward slashes",
        );
    }
    if !domain.contains('.') {
        issues.push(
            IssueCode::InvalidFormat,
            FIELD,
            "custom domain must contain at least one dot",
        );
    }
    if domain.to_ascii_lowercase().ends_with(RESERVED_DOMAIN_SUFFIX) {
        issues.push(
            IssueCode::Reserved,
            FIELD,
            format!("custom domain cannot end with '{RESERVED_DOMAIN_SUFFIX}'"),
        );
    }
    if !domain.contains('/') && !DOMAIN.is_match(domain) {
        issues.push(
            IssueCode::InvalidFormat,
            FIELD,
            format!("custom domain must be a valid domain name: {domain}"),
        );
    }
}

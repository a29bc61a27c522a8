//! Configuração do despesa carregada a partir de `despesa.toml`.
//!
//! A struct [`DespesaConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `DESPESA_WORKBOOK_DIR` tem precedência sobre o
//! arquivo.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuração de nível superior carregada de `despesa.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DespesaConfig {
    /// Diretório com as planilhas de referência exportadas
    /// (`gl_accounts.csv` e `data_list.csv`).
    #[serde(default = "default_workbook_dir")]
    pub workbook_dir: String,

    /// URL do bucket para upload de recibos.
    /// Uploads são ignorados quando vazio.
    #[serde(default)]
    pub receipt_bucket_url: String,

    /// Idade máxima (em segundos) do cache de dados de referência.
    /// Zero desativa o limite de frescor.
    #[serde(default)]
    pub refdata_max_age_secs: u64,
}

// Valor padrão para o diretório do workbook: "expense_workbook".
fn default_workbook_dir() -> String {
    "expense_workbook".to_string()
}

impl Default for DespesaConfig {
    fn default() -> Self {
        Self {
            workbook_dir: default_workbook_dir(),
            receipt_bucket_url: String::new(),
            refdata_max_age_secs: 0,
        }
    }
}

impl DespesaConfig {
    /// Carrega a configuração de `despesa.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let path = Path::new("despesa.toml");
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<DespesaConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração.
        if let Ok(dir) = std::env::var("DESPESA_WORKBOOK_DIR")
            && !dir.is_empty()
        {
            config.workbook_dir = dir;
        }

        Ok(config)
    }

    /// Limite de frescor do cache de referência, se configurado.
    pub fn refdata_max_age(&self) -> Option<Duration> {
        if self.refdata_max_age_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.refdata_max_age_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = DespesaConfig::default();
        assert_eq!(config.workbook_dir, "expense_workbook");
        assert!(config.receipt_bucket_url.is_empty());
        assert_eq!(config.refdata_max_age_secs, 0);
        assert!(config.refdata_max_age().is_none());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            workbook_dir = "/srv/despesa/workbook"
            refdata_max_age_secs = 300
        "#;
        let config: DespesaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workbook_dir, "/srv/despesa/workbook");
        assert_eq!(config.refdata_max_age_secs, 300);
        assert_eq!(config.refdata_max_age(), Some(Duration::from_secs(300)));
        assert!(config.receipt_bucket_url.is_empty());
    }

    #[test]
    fn load_falls_back_to_defaults() {
        // No ambiente de teste, tipicamente não há despesa.toml no
        // diretório de trabalho.
        let config = DespesaConfig::load().unwrap();
        assert!(!config.workbook_dir.is_empty());
    }
}

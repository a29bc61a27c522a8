//! Tipos de erro para o provedor de dados de referência de despesas.
//!
//! Define [`ReferenceDataError`] com variantes para pasta de trabalho
//! ausente, planilha ausente e linhas malformadas. Usa `thiserror` para
//! derivar `Display` e `Error` a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao consumir a pasta de trabalho de referência.
///
/// As mensagens são voltadas ao operador: explicam o que faltou e como
/// remediar a implantação, porque a submissão de relatórios falha fechada
/// enquanto os dados de referência estiverem indisponíveis.
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    /// O diretório da pasta de trabalho exportada não existe no host.
    #[error(
        "expense reference workbook not found at '{path}'; required sheets: \
         gl_accounts.csv, data_list.csv. Ensure the exported workbook \
         directory exists on the application host"
    )]
    MissingWorkbook { path: String },

    /// Uma planilha obrigatória está ausente do diretório exportado.
    #[error(
        "expense reference workbook at '{path}' is missing required sheet \
         '{sheet}'. Verify the deployed workbook matches the template \
         structure"
    )]
    MissingSheet { path: String, sheet: String },

    /// Uma planilha existe mas não pôde ser interpretada.
    #[error("malformed reference sheet '{sheet}': {detail}")]
    Malformed { sheet: String, detail: String },

    /// Falha de E/S subjacente ao ler uma planilha.
    #[error("failed to read reference sheet: {0}")]
    Io(#[from] std::io::Error),

    /// Erro de CSV ao percorrer as linhas de uma planilha.
    #[error("failed to parse reference sheet: {0}")]
    Csv(#[from] csv::Error),
}

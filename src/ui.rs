//! Interface de terminal do despesa — spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`WorkflowProgress`] acompanha visualmente
//! um relatório percorrendo o ciclo de vida no terminal.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::state_machine::{AuditRecord, ReportStatus};

/// Indicador visual de progresso para um relatório no terminal.
///
/// Exibe um spinner animado durante as transições e mensagens coloridas
/// para aprovação (verde), rejeição (vermelho) e estados intermediários
/// (amarelo).
pub struct WorkflowProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para relatórios aprovados.
    green: Style,
    // Estilo vermelho para relatórios rejeitados.
    red: Style,
    // Estilo amarelo para estados intermediários.
    yellow: Style,
}

impl WorkflowProgress {
    /// Inicia o spinner com a descrição do relatório.
    pub fn start(description: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("Draft: {description}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Atualiza a mensagem do spinner para refletir o passo atual.
    pub fn step(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    /// Finaliza o spinner e exibe o estado final do relatório.
    pub fn complete(&self, status: ReportStatus) {
        self.pb.finish_and_clear();
        match status {
            ReportStatus::Approved => {
                println!("  {} Report approved", self.green.apply_to("✓"));
            }
            ReportStatus::Rejected => {
                println!("  {} Report rejected", self.red.apply_to("✗"));
            }
            other => {
                println!("  {} Report is {other}", self.yellow.apply_to("•"));
            }
        }
    }

    /// Imprime a trilha de auditoria formatada em JSON com estilo colorido.
    pub fn print_audit(&self, records: &[AuditRecord]) {
        println!();
        println!("{}", self.yellow.apply_to("─── Audit Trail ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(records).unwrap_or_default()
        );
    }
}

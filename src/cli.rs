//! Interface de linha de comando do despesa baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (workbook, demo)
//! e a flag global --verbose.

use clap::{Parser, Subcommand};

/// despesa — Motor de fluxo de relatórios de despesas com revisão por supervisor.
#[derive(Debug, Parser)]
#[command(name = "despesa", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspeciona a pasta de trabalho de referência (contas GL e categorias).
    Workbook {
        /// Caminho alternativo para o diretório das planilhas exportadas.
        #[arg(long)]
        dir: Option<String>,
    },

    /// Executa a demonstração embutida do ciclo de vida de um relatório.
    Demo,
}

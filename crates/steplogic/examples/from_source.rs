//! Example: Parsing a step-logic description
//!
//! This example demonstrates the basic workflow of:
//! 1. Creating a ProgramBuilder with default configuration
//! 2. Parsing a German program description
//! 3. Walking the recovered steps, references and variables

use steplogic::{ProgramBuilder, config::AppConfig, model::Operator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = "\
Hauptprogramm Einfuhr FB100

RUHE: Grundstellung
    NICHT HMI01 HAND
    Sicherheitsbereich 1 OK

SCHRITT 1: Freigabe?
- Horde vorselektiert (Selektionsprogramm Horde SCHRITT 2+5+8+11)
- Füllen 1e Horde aktiv:
  - Füllen Horde aktiv (Füllen Horde N21 SCHRITT 7)
  - + Füllen Horde aktiv (Füllen Horde N22 SCHRITT 7)
- Zeit 10sek

SCHRITT 2: Start öffnen
- Start offen
";

    let builder = ProgramBuilder::new(AppConfig::default())?;

    println!("Parsing program description...");
    let program = builder.parse_strict(source)?;

    for step in program.steps() {
        println!("\n{} {:?}: {}", step.kind(), step.number(), step.description());
        for group in step.entry_conditions() {
            let joiner = match group.operator() {
                Operator::And => " AND ",
                Operator::Or => " OR ",
            };
            let conditions: Vec<&str> = group.conditions().iter().map(|c| c.raw_text()).collect();
            println!("  entry: {}", conditions.join(joiner));
        }
    }

    println!("\nCross-references:");
    for reference in program.cross_references() {
        println!(
            "  line {}: {:?} steps {:?}",
            reference.source_line(),
            reference.target_program(),
            reference.target_steps()
        );
    }

    println!("\nVariables:");
    for variable in program.variables() {
        println!("  {} ({:?})", variable.name(), variable.kind());
    }

    println!("\n{:?}", program.statistics());
    Ok(())
}

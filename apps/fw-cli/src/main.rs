use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use fw_app::{
    AppError, AppResult, RunMode, RunOutcome, RunProgressEvent, RunRequest, RunResponse,
    RunStage, case_service, run_case_with_progress,
};
use fw_project::{ExhaustionPolicyDef, RectangularWing};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fw-cli")]
#[command(about = "flexwing CLI - static, dynamic and trim aeroelastic coupling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax, references and ranges
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Write a rectangular-wing case file
    Generate {
        /// Output YAML path
        output: PathBuf,
        /// Semispan in meters
        #[arg(long, default_value_t = 5.0)]
        semispan: f64,
        /// Chord in meters
        #[arg(long, default_value_t = 1.0)]
        chord: f64,
        /// Three-node elements per semispan
        #[arg(long, default_value_t = 4)]
        elements: usize,
        /// Chordwise panels
        #[arg(long, default_value_t = 4)]
        panels: usize,
        /// Free-stream speed in m/s
        #[arg(long, default_value_t = 10.0)]
        u_inf: f64,
        /// Angle of attack in degrees
        #[arg(long, default_value_t = 2.0)]
        alpha: f64,
        /// What to do when a step runs out of FSI substeps
        #[arg(long, value_enum, default_value_t = PolicyArg::Warn)]
        on_exhaustion: PolicyArg,
    },
    /// Run a case
    #[command(subcommand)]
    Run(RunCommands),
}

#[derive(Subcommand)]
enum RunCommands {
    /// Coupled static equilibrium
    Static {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Time-marching coupled run
    Dynamic {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Trim search over the case's trim variables
    Trim {
        /// Path to the case YAML file
        case_path: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Warn,
    Fail,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Generate {
            output,
            semispan,
            chord,
            elements,
            panels,
            u_inf,
            alpha,
            on_exhaustion,
        } => {
            let wing = RectangularWing {
                name: output
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "rectangular wing".to_string()),
                semispan_m: semispan,
                chord_m: chord,
                elements_per_side: elements,
                chordwise_panels: panels,
                u_inf_mps: u_inf,
                alpha_deg: alpha,
                exhaustion_policy: match on_exhaustion {
                    PolicyArg::Warn => ExhaustionPolicyDef::Warn,
                    PolicyArg::Fail => ExhaustionPolicyDef::Fail,
                },
                ..RectangularWing::default()
            };
            cmd_generate(&output, &wing)
        }
        Commands::Run(run_cmd) => match run_cmd {
            RunCommands::Static { case_path, json } => cmd_run(&case_path, RunMode::Static, json),
            RunCommands::Dynamic { case_path, json } => {
                cmd_run(&case_path, RunMode::Dynamic, json)
            }
            RunCommands::Trim { case_path, json } => cmd_run(&case_path, RunMode::Trim, json),
        },
    }
}

fn cmd_validate(case_path: &Path) -> AppResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = case_service::load_case(case_path)?;
    case_service::validate_case(&case)?;
    let s = case_service::summarize(&case);
    println!("✓ Case is valid: {}", s.name);
    println!(
        "  {} nodes, {} elements, {} surfaces, {} aero nodes, {} control surfaces",
        s.node_count, s.element_count, s.surface_count, s.aero_node_count, s.control_surface_count
    );
    if s.has_trim {
        println!("  trim settings present");
    }
    Ok(())
}

fn cmd_generate(output: &Path, wing: &RectangularWing) -> AppResult<()> {
    let case = wing.build();
    case_service::validate_case(&case)?;
    case_service::save_case(output, &case)?;
    println!(
        "✓ Wrote {} ({} nodes, {} elements)",
        output.display(),
        case.structure.nodes.len(),
        case.structure.elements.len()
    );
    Ok(())
}

fn cmd_run(case_path: &Path, mode: RunMode, json: bool) -> AppResult<()> {
    let request = RunRequest { case_path, mode };

    let mut last_emit = Instant::now();
    let mut last_stage = String::new();
    let response = run_case_with_progress(
        &request,
        Some(&mut |event| {
            if json {
                return;
            }
            let stage_key = event.stage.label().to_string();
            let emit_now = stage_key != last_stage || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = stage_key;
                last_emit = Instant::now();
            }
        }),
    )?;

    if json {
        let text = serde_json::to_string_pretty(&response)
            .map_err(|e| AppError::Project(format!("Failed to serialize result: {e}")))?;
        println!("{text}");
    } else {
        clear_progress_line();
        print_response(&response);
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.dynamic) {
        (RunStage::RunningDynamic, Some(d)) => {
            let width = 28usize;
            let filled = ((d.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            let mut line = format!(
                "\r[{}] {:>6.2}%  step={}/{}  elapsed={:.1}s",
                bar,
                d.fraction_complete * 100.0,
                d.step,
                d.n_time_steps,
                event.elapsed_wall_s
            );
            if let Some(r) = d.residual {
                line.push_str(&format!("  residual={r:.3e}"));
            }
            print!("{line}");
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {msg}"));
            }
            print!("{line}");
        }
    }
    let _ = io::stdout().flush();
}

fn print_response(response: &RunResponse) {
    println!("✓ {} finished", response.case_name);
    match &response.outcome {
        RunOutcome::Static {
            converged,
            substeps,
            residual,
            resultants,
            aero_force_body,
            max_displacement_m,
        } => {
            println!(
                "  converged={converged}  substeps={substeps}  residual={residual:.3e}"
            );
            println!(
                "  aero force (body)  = [{:.4}, {:.4}, {:.4}] N",
                aero_force_body[0], aero_force_body[1], aero_force_body[2]
            );
            print_resultants(resultants);
            println!("  max displacement   = {max_displacement_m:.4e} m");
        }
        RunOutcome::Dynamic {
            steps,
            converged_steps,
            exhausted_steps,
            total_substeps,
            max_residual,
            aero_force_inertial,
            max_displacement_m,
        } => {
            println!(
                "  steps={steps}  converged={converged_steps}  exhausted={exhausted_steps}  substeps={total_substeps}"
            );
            println!("  max residual       = {max_residual:.3e}");
            println!(
                "  aero force (G)     = [{:.4}, {:.4}, {:.4}] N",
                aero_force_inertial[0], aero_force_inertial[1], aero_force_inertial[2]
            );
            println!("  max displacement   = {max_displacement_m:.4e} m");
        }
        RunOutcome::Trim {
            converged,
            alpha_deg,
            beta_deg,
            roll_deg,
            cs_deflection_deg,
            thrust_n,
            differential_thrust,
            objective,
            resultants,
            evaluations,
        } => {
            println!("  converged={converged}  evaluations={evaluations}  objective={objective:.3e}");
            println!("  alpha={alpha_deg:.4} deg  beta={beta_deg:.4} deg  roll={roll_deg:.4} deg");
            for (i, d) in cs_deflection_deg.iter().enumerate() {
                println!("  control surface {i}: {d:.4} deg");
            }
            for (i, t) in thrust_n.iter().enumerate() {
                println!("  thrust {i}: {t:.4} N");
            }
            if let Some([base, d]) = differential_thrust {
                println!("  base thrust {base:.4} N, differential {d:.4}");
            }
            print_resultants(resultants);
        }
    }
    let t = &response.timing;
    println!(
        "  timing: compile {:.3}s, solve {:.3}s, total {:.3}s",
        t.compile_time_s, t.solve_time_s, t.total_time_s
    );
}

fn print_resultants(r: &[f64; 6]) {
    println!(
        "  resultant force    = [{:.4}, {:.4}, {:.4}] N",
        r[0], r[1], r[2]
    );
    println!(
        "  resultant moment   = [{:.4}, {:.4}, {:.4}] N m",
        r[3], r[4], r[5]
    );
}

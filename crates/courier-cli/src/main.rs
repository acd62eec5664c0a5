use courier_core::WorkflowEngine;
use courier_persistence::{PgWorkflowStore, PoolProvider};
use uuid::Uuid;

/// CLI mínima de operación contra el backend Postgres:
/// `courier-cli complete --user <UUID> --order <UUID> --step <CODE> [--details <TXT>]`
/// `courier-cli timeline --order <UUID>`
/// `courier-cli progress --user <UUID> [--order <UUID>]`
/// `courier-cli steps --role <ROLE>`
fn main() {
    // Cargar .env si existe para obtener DATABASE_URL
    let _ = dotenvy::dotenv();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage_and_exit();
    }

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("[courier] requiere DATABASE_URL para operar contra backend persistente");
        std::process::exit(4);
    }
    let pool = match courier_persistence::build_dev_pool_from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[courier] pool error: {e}");
            std::process::exit(5);
        }
    };
    let store = PgWorkflowStore::new(PoolProvider { pool });
    let engine = WorkflowEngine::new(store);

    match args[1].as_str() {
        "complete" => {
            let mut user: Option<Uuid> = None;
            let mut order: Option<Uuid> = None;
            let mut step: Option<String> = None;
            let mut details: Option<String> = None;
            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--user" => {
                        i += 1;
                        if i < args.len() { user = Uuid::parse_str(&args[i]).ok(); }
                    }
                    "--order" => {
                        i += 1;
                        if i < args.len() { order = Uuid::parse_str(&args[i]).ok(); }
                    }
                    "--step" => {
                        i += 1;
                        if i < args.len() { step = Some(args[i].clone()); }
                    }
                    "--details" => {
                        i += 1;
                        if i < args.len() { details = Some(args[i].clone()); }
                    }
                    _ => {}
                }
                i += 1;
            }
            let (user_id, order_id, step_code) = match (user, order, step) {
                (Some(u), Some(o), Some(s)) => (u, o, s),
                _ => usage_and_exit(),
            };
            // El chequeo de arranque corre antes de cualquier escritura.
            if let Err(e) = engine.validate_required_statuses() {
                eprintln!("[courier complete] catálogo de statuses incompleto: {e}");
                std::process::exit(3);
            }
            match engine.apply_workflow_transition(order_id, &step_code, user_id, details.as_deref().unwrap_or("")) {
                Ok(outcome) => {
                    println!("completado: order={} step={} status={:?}",
                             order_id,
                             step_code,
                             outcome.status_applied.as_ref().map(|s| s.name()));
                    std::process::exit(0);
                }
                Err(e) if e.is_not_found() => {
                    eprintln!("[courier complete] referencia no resuelta: {e}");
                    std::process::exit(4);
                }
                Err(e) => {
                    eprintln!("[courier complete] error: {e}");
                    std::process::exit(5);
                }
            }
        }
        "timeline" => {
            let order = flag_uuid(&args, "--order");
            let order_id = match order {
                Some(o) => o,
                None => usage_and_exit(),
            };
            match engine.timeline_for_order(order_id) {
                Ok(entries) => {
                    for entry in &entries {
                        println!("{}", serde_json::to_string(entry).expect("serializar entrada"));
                    }
                    std::process::exit(0);
                }
                Err(e) => {
                    eprintln!("[courier timeline] error: {e}");
                    std::process::exit(4);
                }
            }
        }
        "progress" => {
            let user = flag_uuid(&args, "--user");
            let order = flag_uuid(&args, "--order");
            let user_id = match user {
                Some(u) => u,
                None => usage_and_exit(),
            };
            let view = match order {
                Some(order_id) => engine.progress_for_user_in_order(user_id, order_id),
                None => engine.progress_for_user(user_id),
            };
            match view {
                Ok(view) => {
                    println!("{}", serde_json::to_string_pretty(&view).expect("serializar vista"));
                    std::process::exit(0);
                }
                Err(e) => {
                    eprintln!("[courier progress] error: {e}");
                    std::process::exit(4);
                }
            }
        }
        "steps" => {
            let mut role: Option<String> = None;
            let mut i = 2;
            while i < args.len() {
                if args[i] == "--role" {
                    i += 1;
                    if i < args.len() { role = Some(args[i].clone()); }
                }
                i += 1;
            }
            let role = match role {
                Some(r) => r,
                None => usage_and_exit(),
            };
            for step in engine.steps_for_role(&role) {
                println!("{:>3}  {}  {}", step.order_index(), step.code(), step.name());
            }
            std::process::exit(0);
        }
        _ => usage_and_exit(),
    }
}

fn flag_uuid(args: &[String], flag: &str) -> Option<Uuid> {
    let mut i = 2;
    while i < args.len() {
        if args[i] == flag {
            i += 1;
            if i < args.len() {
                return Uuid::parse_str(&args[i]).ok();
            }
        }
        i += 1;
    }
    None
}

fn usage_and_exit() -> ! {
    eprintln!("Uso: courier-cli complete --user <UUID> --order <UUID> --step <CODE> [--details <TXT>]");
    eprintln!("     courier-cli timeline --order <UUID>");
    eprintln!("     courier-cli progress --user <UUID> [--order <UUID>]");
    eprintln!("     courier-cli steps --role <ROLE>");
    std::process::exit(2);
}

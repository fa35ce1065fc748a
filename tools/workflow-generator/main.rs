use clap::Parser;
use rand::{Rng, rngs::ThreadRng};
use serde_json::{Value, json};
use std::fs;

/// A CLI tool to generate random workflow exports for the FlowAudit analyzer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_workflow.json")]
    output: String,

    /// Number of action steps to generate
    #[arg(long, default_value_t = 20)]
    actions: usize,

    /// Number of triggers to generate
    #[arg(long, default_value_t = 1)]
    triggers: usize,

    /// Probability that a step gets an extra edge back to an earlier step
    #[arg(long, default_value_t = 0.05)]
    cycle_probability: f64,

    /// Probability that a step is generated with a configuration defect
    #[arg(long, default_value_t = 0.2)]
    defect_probability: f64,
}

const ACTION_TYPES: &[&str] = &[
    "SendEmail",
    "SendSms",
    "Webhook",
    "HttpRequest",
    "Delay",
    "Condition",
    "AddTag",
    "UpdateContact",
    "BulkEmail",
    "Payment",
];

const TRIGGER_TYPES: &[&str] = &["form_submitted", "tag_added", "contact_created"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    for (name, p) in [
        ("--cycle-probability", cli.cycle_probability),
        ("--defect-probability", cli.defect_probability),
    ] {
        if !(0.0..=1.0).contains(&p) {
            eprintln!("Error: {} must be between 0 and 1, got {}", name, p);
            std::process::exit(1);
        }
    }

    println!(
        "Generating workflow ({} actions, {} triggers)...",
        cli.actions, cli.triggers
    );

    let triggers = generate_triggers(&mut rng, cli.triggers, cli.actions > 0);
    let actions = generate_actions(&mut rng, &cli);

    let workflow = json!({
        "id": format!("wf-{}", rng.random_range(1000..10_000)),
        "name": "Generated workflow",
        "status": if rng.random_bool(0.5) { "active" } else { "draft" },
        "estimatedContacts": rng.random_range(0..5_000),
        "variables": ["first_name", "coupon_code"],
        "triggers": triggers,
        "actions": actions,
    });

    let json_output = serde_json::to_string_pretty(&workflow)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved workflow to '{}'",
        cli.output
    );

    Ok(())
}

fn generate_triggers(rng: &mut ThreadRng, count: usize, has_actions: bool) -> Vec<Value> {
    (1..=count)
        .map(|i| {
            let trigger_type = TRIGGER_TYPES[rng.random_range(0..TRIGGER_TYPES.len())];
            let next: Vec<&str> = if has_actions { vec!["a1"] } else { vec![] };
            json!({
                "id": format!("t{}", i),
                "type": trigger_type,
                "config": { "formId": format!("form-{}", rng.random_range(1..3)) },
                "next": next,
            })
        })
        .collect()
}

fn generate_actions(rng: &mut ThreadRng, cli: &Cli) -> Vec<Value> {
    let mut actions = Vec::with_capacity(cli.actions);
    let mut cycles = 0;

    for i in 1..=cli.actions {
        let action_type = ACTION_TYPES[rng.random_range(0..ACTION_TYPES.len())];
        let defective = rng.random_bool(cli.defect_probability);
        let config = generate_config(rng, action_type, defective);

        let mut next = Vec::new();
        let mut branches = Vec::new();
        if i < cli.actions {
            let following = format!("a{}", i + 1);
            if action_type == "Condition" {
                branches.push(json!({ "label": "yes", "target": following }));
                let skip_to = (i + 2).min(cli.actions);
                branches.push(json!({ "label": "no", "target": format!("a{}", skip_to) }));
            } else {
                next.push(following);
            }
        }
        if i > 1 && rng.random_bool(cli.cycle_probability) {
            next.push(format!("a{}", rng.random_range(1..i)));
            cycles += 1;
        }

        actions.push(json!({
            "id": format!("a{}", i),
            "type": action_type,
            "name": format!("{} {}", action_type, i),
            "config": config,
            "next": next,
            "branches": branches,
        }));
    }

    println!("-> Generated {} action(s), {} back edge(s).", cli.actions, cycles);
    actions
}

/// A plausible config for the step; defective configs drop the fields the analyzer checks for.
fn generate_config(rng: &mut ThreadRng, action_type: &str, defective: bool) -> Value {
    match action_type {
        "SendEmail" if defective => json!({ "subject": "Hi {{contact.first_name}}" }),
        "SendEmail" => json!({
            "to": "{{contact.email}}",
            "subject": "Hi {{contact.first_name | default: \"there\"}}",
        }),
        "SendSms" if defective => json!({ "message": "Your code: {{coupon_code}}" }),
        "SendSms" => json!({ "to": "{{contact.phone}}", "message": "Thanks!", "validation": true }),
        "Webhook" | "HttpRequest" if defective => json!({ "url": "http://localhost:8080/hook" }),
        "Webhook" | "HttpRequest" => json!({
            "url": "https://hooks.example.com/in",
            "timeout": 10,
            "onError": "continue",
        }),
        "Delay" => {
            let days = if defective {
                rng.random_range(8..30)
            } else {
                rng.random_range(1..7)
            };
            json!({ "delay": format!("{}d", days) })
        }
        "BulkEmail" if defective => json!({ "to": "segment:all" }),
        "BulkEmail" => json!({ "to": "segment:all", "batchSize": 500 }),
        "Payment" if defective => json!({ "amount": 49 }),
        "Payment" => json!({ "amount": 49, "maxRetries": 3 }),
        "Condition" => json!({ "field": "contact.plan", "equals": "pro" }),
        _ => json!({ "value": rng.random_range(0..100) }),
    }
}

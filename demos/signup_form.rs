//! Signup Form Validation
//!
//! This example validates a signup form with conditional rules.
//!
//! Key concepts:
//! - Fluent rules with `when`/`otherwise` branches
//! - Pre-validation transforms written back to the model
//! - Message resolution through resource tables and literal overrides
//! - Serializing the report as JSON
//!
//! Run with: cargo run --example signup_form

use precept::prelude::*;
use std::sync::Arc;

#[derive(Debug)]
struct SignupForm {
    email: String,
    password: String,
    confirm: String,
    business: bool,
    company: Option<String>,
    tax_id: Option<String>,
}

model! {
    SignupForm {
        fields: [email, password, confirm, business, company, tax_id],
    }
}

fn main() {
    println!("=== Signup Form Example ===\n");

    let messages = ResourceTables::new()
        .with("Signup", "email_Required", "We need an email address to reach you.")
        .with("Signup", "company.missing", "Business accounts must name a company.");
    let options = ValidatorOptions {
        convention_lookup: true,
        shared_resource_table: Some("Signup".to_string()),
        ..ValidatorOptions::default()
    };
    let validator = Validator::with_options(options).with_resources(Arc::new(messages));

    let mut rules = validator.configure::<SignupForm>();
    rules
        .rule_for("email")
        .required()
        .before_validation(|_: &SignupForm, _, value| match value {
            Value::Text(text) => Value::from(text.trim().to_lowercase()),
            other => other,
        })
        .matches(r"[^@\s]+@[^@\s]+\.[a-z]+")
        .with_message("{0} does not look like an email address");
    rules
        .rule_for("password")
        .required()
        .length(8, 64)
        .rule_for("confirm")
        .equal_to("password")
        .with_name("Password confirmation");
    rules
        .when(
            |form: &SignupForm| form.business,
            |rules| {
                rules
                    .rule_for("company")
                    .required()
                    .with_key("company.missing");
                rules.rule_for("tax_id").matches(r"[A-Z]{2}[0-9]{8}");
            },
        )
        .otherwise(|rules| {
            rules
                .rule_for("tax_id")
                .must(|value| value.is_null())
                .with_message("Personal accounts have no {0}");
        });
    rules.build().expect("signup rules are well formed");

    let mut form = SignupForm {
        email: "  ADA@Example.com ".to_string(),
        password: "short".to_string(),
        confirm: "shorter".to_string(),
        business: true,
        company: None,
        tax_id: Some("GB1234".to_string()),
    };

    let report = validator.validate(&mut form).expect("signup rules are built");

    println!("Normalized email: {}", form.email);
    println!("Valid: {}\n", report.is_valid());
    for failure in report.failures() {
        println!(
            "  {:<10} [{}] {}",
            failure.path.to_string(),
            failure.check_kind,
            failure.message
        );
    }

    println!("\nAs JSON:");
    println!(
        "{}",
        serde_json::to_string_pretty(&report).expect("reports serialize")
    );
}

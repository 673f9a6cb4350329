use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use neograph_auth::schema::{DirectiveImplementationRegistry, strip_directive_declarations};
use neograph_auth::{
    AuthConfig, DirectiveDeclaration, EntityType, ScopeDirectiveRequest, TypeRegistry,
    augment_schema, generate_scope,
};
use tracing::debug;

use crate::cli::{AugmentArgs, OutputFormat, ScopeArgs};
use crate::output::{print_success, print_warning};

pub fn load_config(path: Option<&Path>) -> Result<AuthConfig> {
    match path {
        Some(path) => {
            let config = AuthConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            debug!(path = %path.display(), "Loaded augmentation config");
            Ok(config)
        }
        None => {
            print_warning("No config given; no directives will be added");
            Ok(AuthConfig::default())
        }
    }
}

pub fn augment(args: &AugmentArgs, config: &AuthConfig) -> Result<()> {
    if args.strict {
        config.validate()?;
    }

    let sdl = fs::read_to_string(&args.schema)
        .with_context(|| format!("Cannot read schema {}", args.schema.display()))?;
    let mut types = TypeRegistry::from_sdl(&sdl)?;
    let before = types.clone();

    let mut implementations = DirectiveImplementationRegistry::new();
    augment_schema(&mut types, &mut implementations, config)
        .context("Schema augmentation failed")?;

    let changed: Vec<&DirectiveDeclaration> = types.changed_directives(&before);
    let replaced: Vec<&str> = changed
        .iter()
        .map(|declaration| declaration.name.as_str())
        .filter(|name| before.directive(name).is_some())
        .collect();
    for name in &replaced {
        print_warning(&format!("Replaced existing @{name} declaration"));
    }

    match args.format {
        OutputFormat::Sdl => {
            let kept = strip_directive_declarations(&sdl, &replaced)?;
            print!("{}", kept.trim_end());
            println!();
            for declaration in &changed {
                println!("\n{}", declaration.to_sdl());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&changed)?);
        }
    }

    print_success(&format!(
        "Added {} and replaced {} directive declaration(s), {} implementation(s) registered",
        changed.len() - replaced.len(),
        replaced.len(),
        implementations.len()
    ));
    Ok(())
}

pub fn scope(args: &ScopeArgs, config: &AuthConfig) {
    let entity: EntityType = args.entity.into();
    let request = ScopeDirectiveRequest {
        type_name: &args.type_name,
        related_type_name: args.related.as_deref(),
        operation: args.operation.into(),
        entity,
        config,
    };

    match generate_scope(&request) {
        Some(directive) => println!("@{directive}"),
        None => print_warning("No scope applies"),
    }
}

//! Command-line interface for xsdvalid

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(author, version, about = "Validate XML documents against XSD 1.0 schemas")]
struct Args {
    /// Schema file path (imports and includes are resolved relative to it)
    #[arg(short, long)]
    schema: String,

    /// XML document to validate
    #[arg(short, long)]
    document: String,

    /// Emit violations as JSON
    #[arg(short, long)]
    json: bool,
}

#[cfg(feature = "cli")]
fn main() {
    use std::path::Path;
    use xsdvalid::loaders::SchemaLoader;
    use xsdvalid::{Validator, XmlDocument};

    let args = Args::parse();

    let base_dir = Path::new(&args.schema)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    let loader = SchemaLoader::with_base_dir(base_dir);

    let schema = match loader.load_with_imports(&args.schema) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    let doc = match XmlDocument::from_file(&args.document) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    let violations = Validator::new(&schema).validate(&doc);

    if args.json {
        match serde_json::to_string_pretty(&violations) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(2);
            }
        }
    } else if violations.is_empty() {
        println!("{}: valid", args.document);
    } else {
        for violation in &violations {
            let location = violation
                .element
                .as_ref()
                .map(|e| format!("{}:{}", e.position.line, e.position.column))
                .unwrap_or_else(|| "-".to_string());
            println!("{} [{}] {}", location, violation.code, violation.message);
        }
        println!("{}: {} violation(s)", args.document, violations.len());
    }

    if !violations.is_empty() {
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}

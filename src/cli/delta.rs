use std::path::PathBuf;
use std::process;

use clap::Args;
use trainscript::layer::compute_delta;
use trainscript::DeltaStyle;

#[derive(Args)]
pub struct DeltaArgs {
    /// Layers of the existing model (.json array)
    pub old: PathBuf,
    /// Layers of the model to build (.json array)
    pub new: PathBuf,
    /// Render functional-API calls instead of a sequential model
    #[arg(long)]
    pub general: bool,
    /// Variable holding the existing model
    #[arg(long, default_value = "base_model")]
    pub model: String,
    /// Variable the rebuilt model is assigned to
    #[arg(long, default_value = "new_model")]
    pub output: String,
    /// Print the copy/create classification instead of code
    #[arg(long)]
    pub summary: bool,
}

pub fn cmd_delta(args: DeltaArgs) {
    let (old, new) = match trainscript::load_layer_pair(&args.old, &args.new) {
        Ok(pair) => pair,
        Err(_) => process::exit(1),
    };

    if args.summary {
        for op in compute_delta(&old, &new) {
            let layer = op.layer();
            println!(
                "{:<7} {} ({})",
                if op.is_copy() { "copy" } else { "create" },
                layer.name,
                layer.kind.variant_name()
            );
        }
        return;
    }

    let style = if args.general {
        DeltaStyle::General
    } else {
        DeltaStyle::Linear
    };
    match trainscript::delta(&old, &new, style, &args.model, &args.output) {
        Ok(code) => println!("{}", code),
        Err(errors) => {
            let label = format!("{} -> {}", args.old.display(), args.new.display());
            trainscript::diagnostic::render_diagnostics(&errors, &label, "");
            process::exit(1);
        }
    }
}

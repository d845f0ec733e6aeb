use std::{
	path::{Path, PathBuf},
	time::Duration,
};

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use installer_core::{
	api::Installation,
	components::{resolve_effective_list, LocalRegistry, Overwrites},
	hierarchy::Hierarchy,
	imports::{BinderOptions, ImportBinder, ImportBindings},
	installation::{resolve_component_descriptor, InternalInstallation},
	kubemodel::Scheme,
	store::{KubeStore, Store},
	util::from_yaml,
	Context,
};
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(Parser)]
#[clap(version, author = "Lach")]
struct Opts {
	/// Abort resolution after this many seconds
	#[clap(long, global = true)]
	timeout: Option<u64>,
	/// YAML list of component overwrite rules applied to root references
	#[clap(long, global = true)]
	overwrites: Option<PathBuf>,
	#[clap(subcommand)]
	sub: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
	/// Print effective component list of an installation manifest
	Components {
		/// Directory laid out as <component>/<version>.yaml
		#[clap(long, env = "INSTALLER_REGISTRY")]
		registry: PathBuf,
		file: PathBuf,
	},
	/// Bind imports of an installation living in the cluster
	Imports {
		#[clap(long, short, default_value = "default")]
		namespace: String,
		name: String,
		/// Also resolve the component graph from this registry
		#[clap(long, env = "INSTALLER_REGISTRY")]
		registry: Option<PathBuf>,
		/// Override context derived from the installation owner
		#[clap(long, conflicts_with = "registry")]
		context: Option<String>,
		/// Let target list references also see exported targets
		#[clap(long)]
		no_restrict_to_import: bool,
	},
}

async fn read_yaml<T: DeserializeOwned>(file: &Path) -> anyhow::Result<T> {
	let contents = tokio::fs::read_to_string(file)
		.await
		.with_context(|| format!("failed to read {}", file.display()))?;
	Ok(from_yaml(&contents, &file.display().to_string())?)
}

async fn components(
	ctx: &Context,
	overwrites: &Overwrites,
	registry: PathBuf,
	file: PathBuf,
) -> anyhow::Result<()> {
	let inst: Installation = read_yaml(&file).await?;
	let registry = LocalRegistry::new(registry);
	let root = match resolve_component_descriptor(ctx, &registry, overwrites, &inst).await? {
		Some(root) => root,
		None => bail!("installation has no component descriptor"),
	};
	let list = resolve_effective_list(ctx, &registry, root).await?;
	if let Some(root) = list.root() {
		log::info!("Resolved {} components for {}", list.len(), root.reference());
	}
	println!("{}", serde_json::to_string_pretty(&list)?);
	Ok(())
}

fn bindings_json(bindings: &ImportBindings) -> serde_json::Value {
	let mut out = serde_json::Map::new();
	for (import, result) in bindings.data.iter() {
		let value = match result {
			Ok(binding) => json!({
				"data": binding.object.data(),
				"generation": binding.object.generation(),
				"owner": binding.owner.as_ref().map(|o| &o.name),
			}),
			Err(e) => json!({ "error": e.to_string() }),
		};
		out.insert(import.clone(), value);
	}
	for (import, result) in bindings.targets.iter() {
		let value = match result {
			Ok(binding) => json!({
				"targets": binding.targets.iter().map(|t| t.name()).collect::<Vec<_>>(),
				"references": binding.references,
			}),
			Err(e) => json!({ "error": e.to_string() }),
		};
		out.insert(import.clone(), value);
	}
	serde_json::Value::Object(out)
}

async fn imports(
	ctx: &Context,
	overwrites: &Overwrites,
	namespace: String,
	name: String,
	registry: Option<PathBuf>,
	context: Option<String>,
	restrict_to_import: bool,
) -> anyhow::Result<()> {
	let store = KubeStore::try_default().await?;
	let inst: Installation = ctx.run(store.get(&namespace, &name)).await?;
	let binder = ImportBinder::with_options(store, BinderOptions { restrict_to_import });
	let hierarchy = Hierarchy::new(&Scheme::landscaper())?;

	let (bindings, out, previous) = match registry {
		Some(registry) => {
			let registry = LocalRegistry::new(registry);
			let internal =
				InternalInstallation::resolve(ctx, &registry, overwrites, &binder, &hierarchy, inst)
					.await?;
			let out = json!({
				"context": internal.context_name,
				"components": internal.components,
				"imports": bindings_json(&internal.imports),
			});
			let previous = internal.installation.status.map(|s| s.imports);
			(internal.imports, out, previous)
		}
		None => {
			let context_name = context.unwrap_or_else(|| hierarchy.context_name(&inst));
			log::info!("Binding imports of {} in {:?}", name, context_name);
			let bindings = binder.bind(ctx, &context_name, &inst).await?;
			let out = json!({
				"context": context_name,
				"imports": bindings_json(&bindings),
			});
			(bindings, out, inst.status.map(|s| s.imports))
		}
	};
	println!("{}", serde_json::to_string_pretty(&out)?);

	let outdated = bindings.outdated(previous.as_deref().unwrap_or_default());
	if !outdated.is_empty() {
		log::info!("Imports changed since last recorded status: {}", outdated.join(", "));
	}
	let failed = bindings.errors().count();
	if failed != 0 {
		bail!("{} imports failed to resolve", failed);
	}
	Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let opts: Opts = Opts::parse();

	let (mut ctx, cancel) = Context::background().with_cancel();
	if let Some(timeout) = opts.timeout {
		ctx = ctx.with_timeout(Duration::from_secs(timeout));
	}
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			log::warn!("Interrupted, cancelling");
			cancel.cancel();
		}
	});

	let overwrites: Overwrites = match &opts.overwrites {
		Some(file) => read_yaml(file).await?,
		None => Overwrites::default(),
	};

	match opts.sub {
		SubCommand::Components { registry, file } => {
			components(&ctx, &overwrites, registry, file).await
		}
		SubCommand::Imports {
			namespace,
			name,
			registry,
			context,
			no_restrict_to_import,
		} => {
			imports(
				&ctx,
				&overwrites,
				namespace,
				name,
				registry,
				context,
				!no_restrict_to_import,
			)
			.await
		}
	}
}

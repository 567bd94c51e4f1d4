use crate::output::print_json;
use anyhow::Context;
use ci_tools_core::images::{
    find_files_in_directory, from_files, from_kubernetes_deployments, from_prow_job_config,
    from_tekton_task, from_terraform, unique_images, JobConfig,
};
use ci_tools_core::security_config::SecurityConfig;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

const TERRAFORM_FILES: &str = r".*\.(tf|tfvars)$";
const YAML_FILES: &str = r".*\.(yaml|yml)$";

#[derive(Args, Debug)]
pub struct DetectImagesArgs {
    /// Security scanner config whose image list is rewritten
    #[arg(long)]
    pub sec_scanner_config: PathBuf,

    /// Main Prow config file
    #[arg(long, requires = "prow_jobs_dir")]
    pub prow_config: Option<PathBuf>,

    /// Directory with Prow job definitions
    #[arg(long, requires = "prow_config")]
    pub prow_jobs_dir: Option<PathBuf>,

    /// Directory with Terraform files
    #[arg(long)]
    pub terraform_dir: Option<PathBuf>,

    /// Directory with Kubernetes deployment manifests
    #[arg(long)]
    pub kubernetes_dir: Option<PathBuf>,

    /// Directory with Tekton task definitions
    #[arg(long)]
    pub tekton_catalog: Option<PathBuf>,
}

pub fn run(args: DetectImagesArgs, json: bool) -> anyhow::Result<()> {
    let mut config = SecurityConfig::load(&args.sec_scanner_config).with_context(|| {
        format!(
            "failed to load security config {}",
            args.sec_scanner_config.display()
        )
    })?;

    // Start from scratch so images removed from the sources drop out.
    let mut images = Vec::new();

    if let (Some(prow_config), Some(jobs_dir)) = (&args.prow_config, &args.prow_jobs_dir) {
        let jobs = JobConfig::load(prow_config, jobs_dir).context("failed to load prow job config")?;
        images.extend(from_prow_job_config(&jobs));
    }

    if let Some(dir) = &args.terraform_dir {
        let files = find_files_in_directory(dir, TERRAFORM_FILES)
            .with_context(|| format!("failed to find files in terraform directory {}", dir.display()))?;
        images.extend(
            from_files(&files, from_terraform)
                .context("failed to extract images from terraform files")?,
        );
    }

    if let Some(dir) = &args.kubernetes_dir {
        let files = find_files_in_directory(dir, YAML_FILES)
            .with_context(|| format!("failed to find files in kubernetes directory {}", dir.display()))?;
        images.extend(
            from_files(&files, from_kubernetes_deployments)
                .context("failed to extract images from kubernetes files")?,
        );
    }

    if let Some(dir) = &args.tekton_catalog {
        let files = find_files_in_directory(dir, YAML_FILES)
            .with_context(|| format!("failed to find files in tekton catalog {}", dir.display()))?;
        images.extend(
            from_files(&files, from_tekton_task)
                .context("failed to extract images from tekton tasks")?,
        );
    }

    let mut images = unique_images(images);
    images.sort();
    info!("detected {} unique images", images.len());

    config.images = images;
    config
        .save_to_file(&args.sec_scanner_config)
        .context("failed to save security config")?;

    if json {
        print_json(&config.images)?;
    } else {
        println!(
            "Wrote {} images to {}",
            config.images.len(),
            args.sec_scanner_config.display()
        );
    }

    Ok(())
}

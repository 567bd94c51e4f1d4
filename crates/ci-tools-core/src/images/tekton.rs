use super::{kind_of, yaml_documents};
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Default, Deserialize)]
struct Task {
    #[serde(default)]
    spec: TaskSpec,
}

#[derive(Debug, Default, Deserialize)]
struct TaskSpec {
    #[serde(default)]
    steps: Vec<Step>,
    #[serde(default)]
    sidecars: Vec<Step>,
}

#[derive(Debug, Default, Deserialize)]
struct Step {
    #[serde(default)]
    image: String,
}

/// Images used by the steps and sidecars of Tekton `Task`/`ClusterTask`
/// documents.
pub fn from_tekton_task<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut images = Vec::new();
    for doc in yaml_documents(reader)? {
        if !matches!(kind_of(&doc), Some("Task" | "ClusterTask")) {
            continue;
        }
        let task: Task = serde_yaml::from_value(doc)?;
        images.extend(
            task.spec
                .steps
                .into_iter()
                .chain(task.spec.sidecars)
                .map(|s| s.image)
                .filter(|image| !image.is_empty()),
        );
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_step_and_sidecar_images() {
        let task = "apiVersion: tekton.dev/v1beta1
kind: Task
metadata:
  name: git-clone
spec:
  params:
    - name: url
      type: string
  steps:
    - name: clone
      image: gcr.io/tekton-releases/git-init:v0.21.0
      script: |
        git clone $(params.url)
    - name: report
      image: alpine:3.16
  sidecars:
    - name: docker
      image: docker:dind
";
        let images = from_tekton_task(task.as_bytes()).unwrap();
        assert_eq!(
            images,
            vec![
                "gcr.io/tekton-releases/git-init:v0.21.0",
                "alpine:3.16",
                "docker:dind"
            ]
        );
    }

    #[test]
    fn pipelines_are_skipped() {
        let pipeline = "apiVersion: tekton.dev/v1beta1
kind: Pipeline
metadata:
  name: build
spec:
  tasks:
    - name: clone
      taskRef:
        name: git-clone
";
        assert!(from_tekton_task(pipeline.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn step_without_image_is_ignored() {
        let task = "kind: ClusterTask
spec:
  steps:
    - name: inherited
    - name: explicit
      image: busybox
";
        assert_eq!(from_tekton_task(task.as_bytes()).unwrap(), vec!["busybox"]);
    }
}

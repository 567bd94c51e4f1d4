use super::{kind_of, yaml_documents};
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

/// The slice of a Kubernetes pod spec that carries image references.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default)]
    pub init_containers: Vec<Container>,
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

impl PodSpec {
    /// Non-empty images of init containers followed by regular containers.
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.init_containers
            .iter()
            .chain(&self.containers)
            .map(|c| c.image.as_str())
            .filter(|image| !image.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
struct Deployment {
    #[serde(default)]
    spec: DeploymentSpec,
}

#[derive(Debug, Default, Deserialize)]
struct DeploymentSpec {
    #[serde(default)]
    template: PodTemplate,
}

#[derive(Debug, Default, Deserialize)]
struct PodTemplate {
    #[serde(default)]
    spec: PodSpec,
}

/// Images of every `Deployment` in a (possibly multi-document) manifest.
///
/// Other kinds are skipped without looking inside them.
pub fn from_kubernetes_deployments<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut images = Vec::new();
    for doc in yaml_documents(reader)? {
        if kind_of(&doc) != Some("Deployment") {
            continue;
        }
        let deployment: Deployment = serde_yaml::from_value(doc)?;
        images.extend(deployment.spec.template.spec.images().map(String::from));
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_deployment() {
        let manifest = "apiVersion: apps/v1
kind: Deployment
metadata:
  name: test
spec:
  replica: 2
  selector:
    matchLabels:
      app: test
  template:
    metadata:
      labels:
        app: test
    spec:
      terminationGracePeriodSeconds: 30
      containers:
        - name: test
          image: test.gcr.io/test:test
          args:
            - -tets-arg
          ports:
            - containerPort: 8080
              protocol: TCP
          resources:
            requests:
              cpu: 100m
              memory: 100Mi
";
        let images = from_kubernetes_deployments(manifest.as_bytes()).unwrap();
        assert_eq!(images, vec!["test.gcr.io/test:test"]);
    }

    #[test]
    fn service_has_no_images() {
        let manifest = "apiVersion: v1
kind: Service
metadata:
  name: test
spec:
  selector:
    app: test
  type: NodePort
  ports:
    - name: http
      port: 80
      targetPort: 8080
";
        assert!(from_kubernetes_deployments(manifest.as_bytes())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn multiple_resources_and_deployments() {
        let manifest = "apiVersion: v1
kind: ServiceAccount
metadata:
  namespace: default
  name: \"test\"
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: test-deployment
spec:
  template:
    spec:
      containers:
        - name: test
          image: test-image:test
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: test2-deployment
spec:
  template:
    spec:
      initContainers:
        - name: init
          image: test-image:init
      containers:
        - name: test2
          image: test-image:test2
---
";
        let images = from_kubernetes_deployments(manifest.as_bytes()).unwrap();
        assert_eq!(
            images,
            vec!["test-image:test", "test-image:init", "test-image:test2"]
        );
    }

    #[test]
    fn config_map_with_embedded_yaml_is_not_parsed() {
        let manifest = "apiVersion: v1
kind: ConfigMap
metadata:
  namespace: prow-monitoring
  name: grafana-datasources
data:
  datasources.yaml: |
    ---
    apiVersion: 1
    datasources:
      - name: prometheus
        type: prometheus
        url: http://prometheus.prow-monitoring.svc:9090
";
        assert!(from_kubernetes_deployments(manifest.as_bytes())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(from_kubernetes_deployments("kind: [oops".as_bytes()).is_err());
    }
}

use crate::error::ExplainError;
use crate::model::TypeIdentity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource;
use std::collections::BTreeMap;

/// Builtin resources used when no cluster is reachable: plural, short names,
/// apiVersion, kind.
const BUILTIN_RESOURCES: &[(&str, &[&str], &str, &str)] = &[
    ("bindings", &[], "v1", "Binding"),
    ("componentstatuses", &["cs"], "v1", "ComponentStatus"),
    ("configmaps", &["cm"], "v1", "ConfigMap"),
    ("endpoints", &["ep"], "v1", "Endpoints"),
    ("events", &["ev"], "v1", "Event"),
    ("limitranges", &["limits"], "v1", "LimitRange"),
    ("namespaces", &["ns"], "v1", "Namespace"),
    ("nodes", &["no"], "v1", "Node"),
    ("persistentvolumeclaims", &["pvc"], "v1", "PersistentVolumeClaim"),
    ("persistentvolumes", &["pv"], "v1", "PersistentVolume"),
    ("pods", &["po"], "v1", "Pod"),
    ("podtemplates", &[], "v1", "PodTemplate"),
    ("replicationcontrollers", &["rc"], "v1", "ReplicationController"),
    ("resourcequotas", &["quota"], "v1", "ResourceQuota"),
    ("secrets", &[], "v1", "Secret"),
    ("serviceaccounts", &["sa"], "v1", "ServiceAccount"),
    ("services", &["svc"], "v1", "Service"),
    ("mutatingwebhookconfigurations", &[], "admissionregistration.k8s.io/v1", "MutatingWebhookConfiguration"),
    ("validatingwebhookconfigurations", &[], "admissionregistration.k8s.io/v1", "ValidatingWebhookConfiguration"),
    ("customresourcedefinitions", &["crd", "crds"], "apiextensions.k8s.io/v1", "CustomResourceDefinition"),
    ("apiservices", &[], "apiregistration.k8s.io/v1", "APIService"),
    ("controllerrevisions", &[], "apps/v1", "ControllerRevision"),
    ("daemonsets", &["ds"], "apps/v1", "DaemonSet"),
    ("deployments", &["deploy"], "apps/v1", "Deployment"),
    ("replicasets", &["rs"], "apps/v1", "ReplicaSet"),
    ("statefulsets", &["sts"], "apps/v1", "StatefulSet"),
    ("tokenreviews", &[], "authentication.k8s.io/v1", "TokenReview"),
    ("selfsubjectreviews", &[], "authentication.k8s.io/v1", "SelfSubjectReview"),
    ("localsubjectaccessreviews", &[], "authorization.k8s.io/v1", "LocalSubjectAccessReview"),
    ("selfsubjectaccessreviews", &[], "authorization.k8s.io/v1", "SelfSubjectAccessReview"),
    ("selfsubjectrulesreviews", &[], "authorization.k8s.io/v1", "SelfSubjectRulesReview"),
    ("subjectaccessreviews", &[], "authorization.k8s.io/v1", "SubjectAccessReview"),
    ("horizontalpodautoscalers", &["hpa"], "autoscaling/v2", "HorizontalPodAutoscaler"),
    ("cronjobs", &["cj"], "batch/v1", "CronJob"),
    ("jobs", &[], "batch/v1", "Job"),
    ("certificatesigningrequests", &["csr"], "certificates.k8s.io/v1", "CertificateSigningRequest"),
    ("leases", &[], "coordination.k8s.io/v1", "Lease"),
    ("endpointslices", &[], "discovery.k8s.io/v1", "EndpointSlice"),
    ("flowschemas", &[], "flowcontrol.apiserver.k8s.io/v1", "FlowSchema"),
    ("prioritylevelconfigurations", &[], "flowcontrol.apiserver.k8s.io/v1", "PriorityLevelConfiguration"),
    ("ingressclasses", &[], "networking.k8s.io/v1", "IngressClass"),
    ("ingresses", &["ing"], "networking.k8s.io/v1", "Ingress"),
    ("networkpolicies", &["netpol"], "networking.k8s.io/v1", "NetworkPolicy"),
    ("runtimeclasses", &[], "node.k8s.io/v1", "RuntimeClass"),
    ("poddisruptionbudgets", &["pdb"], "policy/v1", "PodDisruptionBudget"),
    ("clusterrolebindings", &[], "rbac.authorization.k8s.io/v1", "ClusterRoleBinding"),
    ("clusterroles", &[], "rbac.authorization.k8s.io/v1", "ClusterRole"),
    ("rolebindings", &[], "rbac.authorization.k8s.io/v1", "RoleBinding"),
    ("roles", &[], "rbac.authorization.k8s.io/v1", "Role"),
    ("priorityclasses", &["pc"], "scheduling.k8s.io/v1", "PriorityClass"),
    ("csidrivers", &[], "storage.k8s.io/v1", "CSIDriver"),
    ("csinodes", &[], "storage.k8s.io/v1", "CSINode"),
    ("csistoragecapacities", &[], "storage.k8s.io/v1", "CSIStorageCapacity"),
    ("storageclasses", &["sc"], "storage.k8s.io/v1", "StorageClass"),
    ("volumeattachments", &[], "storage.k8s.io/v1", "VolumeAttachment"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub plural: String,
    pub singular: String,
    pub short_names: Vec<String>,
    pub identity: TypeIdentity,
}

impl ResourceEntry {
    fn new(plural: &str, singular: &str, short_names: Vec<String>, identity: TypeIdentity) -> Self {
        let singular = if singular.is_empty() {
            identity.kind.to_ascii_lowercase()
        } else {
            singular.to_ascii_lowercase()
        };
        Self {
            plural: plural.to_ascii_lowercase(),
            singular,
            short_names: short_names
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
            identity,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<ResourceEntry>,
    aliases: BTreeMap<String, String>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let entries = BUILTIN_RESOURCES
            .iter()
            .map(|(plural, short_names, api_version, kind)| {
                ResourceEntry::new(
                    plural,
                    "",
                    short_names.iter().map(|name| name.to_string()).collect(),
                    TypeIdentity::from_api_version(api_version, *kind),
                )
            })
            .collect();
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<ResourceEntry>) -> Self {
        Self {
            entries,
            aliases: BTreeMap::new(),
        }
    }

    /// User aliases; each key is rewritten to its value before lookup.
    pub fn with_aliases(mut self, aliases: &BTreeMap<String, String>) -> Self {
        self.aliases = aliases
            .iter()
            .map(|(alias, target)| (alias.to_ascii_lowercase(), target.to_ascii_lowercase()))
            .collect();
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identity_for(&self, name: &str) -> Result<TypeIdentity, ExplainError> {
        let lowered = name.trim().to_ascii_lowercase();
        let wanted = self.aliases.get(&lowered).unwrap_or(&lowered);

        self.entries
            .iter()
            .find(|entry| entry.short_names.iter().any(|short| short == wanted))
            .or_else(|| self.entries.iter().find(|entry| &entry.plural == wanted))
            .or_else(|| self.entries.iter().find(|entry| &entry.singular == wanted))
            .map(|entry| entry.identity.clone())
            .ok_or_else(|| ExplainError::UnknownResource(name.to_string()))
    }
}

/// Catalog entries for one discovery document. Subresources such as
/// `pods/log` are skipped.
pub fn entries_from_discovery(group_version: &str, resources: &[APIResource]) -> Vec<ResourceEntry> {
    resources
        .iter()
        .filter(|resource| !resource.name.contains('/'))
        .map(|resource| {
            let api_version = match (&resource.group, &resource.version) {
                (Some(group), Some(version)) if !group.is_empty() => format!("{group}/{version}"),
                _ => group_version.to_string(),
            };
            ResourceEntry::new(
                &resource.name,
                &resource.singular_name,
                resource.short_names.clone().unwrap_or_default(),
                TypeIdentity::from_api_version(&api_version, resource.kind.clone()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Catalog, entries_from_discovery};
    use crate::error::ExplainError;
    use crate::model::TypeIdentity;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource;
    use std::collections::BTreeMap;

    fn api_resource(name: &str, singular: &str, kind: &str, short: &[&str]) -> APIResource {
        APIResource {
            name: name.to_string(),
            singular_name: singular.to_string(),
            kind: kind.to_string(),
            namespaced: true,
            short_names: (!short.is_empty())
                .then(|| short.iter().map(|name| name.to_string()).collect()),
            ..APIResource::default()
        }
    }

    #[test]
    fn resolves_short_plural_and_singular_names() {
        let catalog = Catalog::builtin();
        let deployment = TypeIdentity::new("apps", "v1", "Deployment");
        for name in ["deploy", "deployments", "deployment", "Deployment", " DEPLOY "] {
            assert_eq!(catalog.identity_for(name).expect(name), deployment);
        }
        assert_eq!(
            catalog.identity_for("po").expect("pods"),
            TypeIdentity::new("", "v1", "Pod")
        );
        assert_eq!(
            catalog.identity_for("crds").expect("crds"),
            TypeIdentity::new("apiextensions.k8s.io", "v1", "CustomResourceDefinition")
        );
    }

    #[test]
    fn unknown_resource_is_reported() {
        let error = Catalog::builtin()
            .identity_for("widgets")
            .expect_err("unknown");
        assert!(matches!(error, ExplainError::UnknownResource(name) if name == "widgets"));
    }

    #[test]
    fn aliases_are_rewritten_before_lookup() {
        let aliases = BTreeMap::from([("dp".to_string(), "Deployments".to_string())]);
        let catalog = Catalog::builtin().with_aliases(&aliases);
        assert_eq!(
            catalog.identity_for("DP").expect("alias"),
            TypeIdentity::new("apps", "v1", "Deployment")
        );
    }

    #[test]
    fn discovery_entries_skip_subresources_and_keep_short_names() {
        let resources = vec![
            api_resource("widgets", "widget", "Widget", &["wd"]),
            api_resource("widgets/status", "", "Widget", &[]),
            api_resource("gadgets", "", "Gadget", &[]),
        ];
        let entries = entries_from_discovery("example.io/v1alpha1", &resources);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].singular, "gadget");

        let catalog = Catalog::from_entries(entries);
        let widget = TypeIdentity::new("example.io", "v1alpha1", "Widget");
        assert_eq!(catalog.identity_for("wd").expect("short"), widget);
        assert_eq!(catalog.identity_for("widget").expect("singular"), widget);
        assert_eq!(
            catalog.identity_for("gadgets").expect("plural").kind,
            "Gadget"
        );
    }

    #[test]
    fn short_names_win_over_plurals() {
        let resources = vec![
            api_resource("sc", "", "Shortcut", &[]),
            api_resource("storageclasses", "", "StorageClass", &["sc"]),
        ];
        let catalog = Catalog::from_entries(entries_from_discovery("v1", &resources));
        assert_eq!(catalog.identity_for("sc").expect("sc").kind, "StorageClass");
    }
}

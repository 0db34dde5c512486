// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use dbsetup_lib::{
        arguments::{build_arguments, trim_path, Argument, ArgumentSet, BuildContext, Value, MASK},
        cluster::ClusterMapping,
        config::{DesiredConfiguration, SecurityMode, StartupType},
        feature,
        inventory::{Action, ServiceIdentity},
        test_env::*,
    };

    fn build(desired: &DesiredConfiguration, cluster: &ClusterMapping) -> ArgumentSet {
        let features: BTreeSet<String> = feature::normalize(&desired.features);
        build_arguments(&BuildContext {
            desired,
            features: &features,
            cluster,
            setup_identity: TEST_SETUP_IDENTITY,
        })
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn minimal_engine_install() {
        let args = build(&desired(&["SQLENGINE"]), &ClusterMapping::default());
        assert_eq!(
            args.render(),
            "/ACTION=\"Install\" /FEATURES=SQLENGINE /IACCEPTSQLSERVERLICENSETERMS=\"True\" \
             /INSTANCENAME=\"MSSQLSERVER\" /QUIET=\"True\" \
             /SQLSYSADMINACCOUNTS=\"CORP\\setupadmin\""
        );
    }

    #[test]
    fn value_rendering() {
        let mut args = ArgumentSet::new();
        args.insert(Argument::new("flag", Value::Bool(false)));
        args.insert(Argument::new("list", Value::List(vec!["b".into(), "a c".into()])));
        args.insert(Argument::new(
            "features",
            Value::Features(vec!["CONN".into(), "SQLENGINE".into()]),
        ));
        args.insert(Argument::new("secret", Value::Secret("pa ss".into())));

        assert_eq!(
            args.render(),
            "/FEATURES=CONN,SQLENGINE /FLAG=\"False\" /LIST=\"a c\" \"b\" /SECRET=\"pa ss\""
        );
    }

    #[test]
    fn empty_values_are_omitted() {
        let mut args = ArgumentSet::new();
        args.insert(Argument::new("EMPTYTEXT", text("")));
        args.insert(Argument::new("EMPTYLIST", Value::List(Vec::new())));
        args.insert(Argument::new("EMPTYSECRET", Value::Secret(String::new())));
        args.insert(Argument::new("KEPT", text("x")));

        assert_eq!(args.render(), "/KEPT=\"x\"");
    }

    #[test]
    fn keys_are_unique_and_upper_case() {
        let mut args = ArgumentSet::new();
        assert_eq!(args.insert(Argument::new("instanceName", text("A"))), None);
        assert_eq!(
            args.insert(Argument::new("INSTANCENAME", text("B"))),
            Some(text("A"))
        );
        assert_eq!(args.len(), 1);
        assert_eq!(args.get("InstanceName"), Some(&text("B")));
    }

    #[test]
    fn trailing_separators_are_trimmed() {
        assert_eq!(trim_path("C:\\Data\\"), "C:\\Data");
        assert_eq!(trim_path("C:\\Data\\\\"), "C:\\Data");
        assert_eq!(trim_path("/srv/media/"), "/srv/media");
        assert_eq!(trim_path("C:\\Data"), "C:\\Data");

        let mut desired = desired(&["SQLENGINE"]);
        desired.engine.data_dir = Some("D:\\MSSQL\\Data\\".to_string());
        desired.engine.backup_dir = Some("D:\\MSSQL\\Backup".to_string());
        desired.instance_dir = Some("C:\\Program Files\\Microsoft SQL Server\\".to_string());

        let args = build(&desired, &ClusterMapping::default());
        assert_eq!(args.get("INSTALLSQLDATADIR"), Some(&text("D:\\MSSQL\\Data")));
        assert_eq!(args.get("SQLBACKUPDIR"), Some(&text("D:\\MSSQL\\Backup")));
        assert_eq!(
            args.get("INSTANCEDIR"),
            Some(&text("C:\\Program Files\\Microsoft SQL Server"))
        );
        assert!(!args.contains("SQLTEMPDBDIR"));
    }

    #[test]
    fn sa_password_only_in_mixed_mode() {
        let mut desired = desired(&["SQLENGINE"]);
        desired.engine.sa_password = Some("Str0ng!Pass".to_string());

        let args = build(&desired, &ClusterMapping::default());
        assert!(!args.contains("SAPWD"));
        assert!(!args.contains("SECURITYMODE"));

        desired.engine.security_mode = SecurityMode::Sql;
        let args = build(&desired, &ClusterMapping::default());
        assert_eq!(args.get("SECURITYMODE"), Some(&text("SQL")));
        assert_eq!(args.get("SAPWD"), Some(&Value::Secret("Str0ng!Pass".to_string())));
    }

    #[test]
    fn secrets_never_appear_in_redacted_rendering() {
        let mut desired = desired(&["SQLENGINE", "FULLTEXT"]);
        desired.engine.security_mode = SecurityMode::Sql;
        desired.engine.sa_password = Some("Str0ng!Pass".to_string());
        desired.product_key = Some("AAAAA-BBBBB-CCCCC".to_string());
        desired.service_accounts.sql =
            Some(ServiceIdentity::new("CORP\\sqlsvc", Some("Svc#Secret")));

        let args = build(&desired, &ClusterMapping::default());
        let redacted = args.render_redacted();
        for secret in ["Str0ng!Pass", "AAAAA-BBBBB-CCCCC", "Svc#Secret"] {
            assert!(!redacted.contains(secret), "{secret} leaked into {redacted}");
            assert!(!args.to_string().contains(secret));
            assert!(!format!("{args:?}").contains(secret));
            assert!(args.render().contains(secret));
        }
        assert!(redacted.contains(&format!("/SAPWD=\"{MASK}\"")));
        assert!(redacted.contains(&format!("/PID=\"{MASK}\"")));
        assert!(redacted.contains(&format!("/SQLSVCPASSWORD=\"{MASK}\"")));
        assert!(redacted.contains("/SQLSVCACCOUNT=\"CORP\\sqlsvc\""));
    }

    #[test]
    fn setup_identity_is_always_an_administrator() {
        let mut desired = desired(&["SQLENGINE", "AS"]);
        desired.engine.sysadmin_accounts = vec![
            "CORP\\DBA Team".to_string(),
            "corp\\SETUPADMIN".to_string(),
        ];

        let args = build(&desired, &ClusterMapping::default());
        assert_eq!(
            args.get("SQLSYSADMINACCOUNTS"),
            Some(&Value::List(vec![
                "CORP\\setupadmin".to_string(),
                "CORP\\DBA Team".to_string(),
            ]))
        );
        assert_eq!(
            args.get("ASSYSADMINACCOUNTS"),
            Some(&Value::List(vec!["CORP\\setupadmin".to_string()]))
        );
        assert!(args
            .render()
            .contains("/SQLSYSADMINACCOUNTS=\"CORP\\DBA Team\" \"CORP\\setupadmin\""));
    }

    #[test]
    fn feature_arguments_follow_the_features_being_installed() {
        let mut desired = desired(&["FULLTEXT"]);
        desired.engine.collation = Some("Latin1_General_CI_AS".to_string());
        desired.engine.data_dir = Some("D:\\Data".to_string());
        desired.analysis.server_mode = Some("tabular".to_string());
        desired.service_accounts.sql = Some(ServiceIdentity::new("NT SERVICE\\MSSQLSERVER", None));
        desired.service_accounts.fulltext =
            Some(ServiceIdentity::new("NT SERVICE\\MSSQLFDLauncher", None));

        let args = build(&desired, &ClusterMapping::default());
        for key in [
            "SQLCOLLATION",
            "INSTALLSQLDATADIR",
            "SQLSYSADMINACCOUNTS",
            "ASSERVERMODE",
            "SQLSVCACCOUNT",
        ] {
            assert!(!args.contains(key), "{key} should not be passed");
        }
        assert_eq!(
            args.get("FTSVCACCOUNT"),
            Some(&text("NT SERVICE\\MSSQLFDLAUNCHER"))
        );

        desired.features.push("as".to_string());
        let args = build(&desired, &ClusterMapping::default());
        assert_eq!(args.get("ASSERVERMODE"), Some(&text("TABULAR")));
    }

    #[test]
    fn browser_startup_type() {
        let mut desired = desired(&["SQLENGINE"]);
        let args = build(&desired, &ClusterMapping::default());
        assert!(!args.contains("BROWSERSVCSTARTUPTYPE"));

        for (startup, rendered) in [
            (StartupType::Automatic, "Automatic"),
            (StartupType::Manual, "Manual"),
            (StartupType::Disabled, "Disabled"),
        ] {
            desired.browser_startup_type = Some(startup);
            let args = build(&desired, &ClusterMapping::default());
            assert_eq!(args.get("BROWSERSVCSTARTUPTYPE"), Some(&text(rendered)));
        }
    }

    #[test]
    fn pass_through_settings() {
        let mut desired = desired(&["SQLENGINE"]);
        desired.instance_id = Some("PROD".to_string());
        desired.update_enabled = Some(false);
        desired.update_source = Some("\\\\media\\updates\\".to_string());

        let args = build(&desired, &ClusterMapping::default());
        assert_eq!(args.get("INSTANCEID"), Some(&text("PROD")));
        assert_eq!(args.get("UPDATEENABLED"), Some(&Value::Bool(false)));
        assert_eq!(args.get("UPDATESOURCE"), Some(&text("\\\\media\\updates")));
        assert!(!args.contains("PID"));
    }

    fn mapping() -> ClusterMapping {
        ClusterMapping {
            disks: Some(vec!["Cluster Disk 2".to_string(), "Cluster Disk 1".to_string()]),
            ip_addresses: Some(vec!["IPv4;10.0.0.5;Client;255.255.255.0".to_string()]),
        }
    }

    #[test]
    fn failover_install_arguments() {
        let desired = desired_cluster(Action::InstallFailoverCluster, &["10.0.0.5"]);
        let args = build(&desired, &mapping());
        let rendered = args.render();

        assert!(rendered.contains("/ACTION=\"InstallFailoverCluster\""));
        assert!(rendered.contains("/SKIPRULES=\"Cluster_VerifyForErrors\""));
        assert!(rendered.contains("/FAILOVERCLUSTERGROUP=\"SQL Server (MSSQLSERVER)\""));
        assert!(rendered.contains("/FAILOVERCLUSTERNETWORKNAME=\"SQLCLU01\""));
        assert!(rendered.contains("/FAILOVERCLUSTERDISKS=\"Cluster Disk 1\" \"Cluster Disk 2\""));
        assert!(rendered
            .contains("/FAILOVERCLUSTERIPADDRESSES=\"IPv4;10.0.0.5;Client;255.255.255.0\""));
    }

    #[test]
    fn add_node_passes_addresses_only() {
        let desired = desired_cluster(Action::AddNode, &["10.0.0.5"]);
        let args = build(&desired, &mapping());

        assert!(args.contains("FAILOVERCLUSTERIPADDRESSES"));
        for key in [
            "SKIPRULES",
            "FAILOVERCLUSTERGROUP",
            "FAILOVERCLUSTERNETWORKNAME",
            "FAILOVERCLUSTERDISKS",
        ] {
            assert!(!args.contains(key), "{key} should not be passed");
        }
    }

    #[test]
    fn prepare_skips_cluster_verification() {
        let desired = desired_cluster(Action::PrepareFailoverCluster, &[]);
        let args = build(&desired, &ClusterMapping::default());

        assert_eq!(args.get("SKIPRULES"), Some(&text("Cluster_VerifyForErrors")));
        assert!(!args.contains("FAILOVERCLUSTERIPADDRESSES"));
        assert!(!args.contains("FAILOVERCLUSTERDISKS"));
    }

    #[test]
    fn standalone_install_has_no_cluster_arguments() {
        let mut desired = desired(&["SQLENGINE"]);
        desired.cluster.group_name = Some("ignored".to_string());

        let args = build(&desired, &mapping());
        assert!(!args.iter().any(|(key, _)| key.starts_with("FAILOVERCLUSTER")));
        assert!(!args.contains("SKIPRULES"));
    }
}

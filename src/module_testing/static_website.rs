#[cfg(test)]
mod tests {
    use crate::*;
    use serde_json::{json, Value};

    const FUNCTION_ARN: &str = "arn:aws:cloudfront::123456789012:function/rewrite-index";

    fn all_props() -> Vec<StaticSiteHostingProps> {
        let function = EdgeFunctionRef::from_arn(FUNCTION_ARN).unwrap();
        let mut out = vec![];
        for policy in [RemovalPolicy::Destroy, RemovalPolicy::Retain] {
            for price_class in [PriceClass::PriceClass100, PriceClass::PriceClass200, PriceClass::PriceClassAll] {
                let base = StaticSiteHostingProps::new("my-site-assets", policy).with_price_class(price_class);
                out.push(base.clone());
                out.push(base.clone().with_function(function.clone()));
                out.push(base.with_stack_name("prod-site").with_tag("env", "prod"));
            }
        }
        out
    }

    fn template_json(stack: &StaticSiteHostingStack) -> Value {
        serde_json::from_str(&stack.template().unwrap().to_json().unwrap()).unwrap()
    }

    #[test]
    fn bucket_is_always_private() {
        for props in all_props() {
            let stack = StaticSiteHostingStack::new(&props).unwrap();
            assert!(stack.bucket().is_private());
            assert_eq!(stack.bucket().access_control(), AccessControl::Private);
            let value = template_json(&stack);
            let bucket = &value["Resources"][stack.bucket().logical_id()];
            assert_eq!(bucket["Properties"]["AccessControl"], "Private");
        }
    }

    #[test]
    fn policy_grants_only_get_object_to_identity() {
        for props in all_props() {
            let stack = StaticSiteHostingStack::new(&props).unwrap();
            let statements: Vec<&PolicyStatement> = stack.bucket_policy().document().statements().collect();
            assert_eq!(statements.len(), 1);
            assert_eq!(statements[0].principals, vec![stack.identity().grant_principal()]);
            assert_eq!(statements[0].actions, vec!["s3:GetObject".to_string()]);
            assert_eq!(statements[0].resources, vec![stack.bucket().objects_arn()]);
        }
    }

    #[test]
    fn distribution_is_read_only_and_https() {
        for props in all_props() {
            let stack = StaticSiteHostingStack::new(&props).unwrap();
            let distr = stack.distribution();
            assert_eq!(distr.allowed_methods(), &[HttpMethod::Get, HttpMethod::Head]);
            assert_eq!(distr.cached_methods(), &[HttpMethod::Get, HttpMethod::Head]);
            assert_eq!(distr.viewer_protocol_policy(), "redirect-to-https");
            assert_eq!(distr.price_class(), props.price_class);
            assert_eq!(distr.error_fallbacks(), ErrorFallback::spa_fallbacks().as_slice());
        }
    }

    #[test]
    fn function_association_follows_input() {
        for props in all_props() {
            let stack = StaticSiteHostingStack::new(&props).unwrap();
            let associations = stack.distribution().function_associations();
            match &props.function {
                None => assert!(associations.is_empty()),
                Some(function) => {
                    assert_eq!(associations.len(), 1);
                    assert_eq!(associations[0].event_type, FunctionEventType::ViewerRequest);
                    assert_eq!(associations[0].function_arn, function.function_arn());
                }
            }
        }
    }

    #[test]
    fn same_inputs_same_template() {
        for props in all_props() {
            let a = StaticSiteHostingStack::new(&props).unwrap();
            let b = StaticSiteHostingStack::new(&props).unwrap();
            assert_eq!(a, b);
            assert_eq!(
                a.template().unwrap().to_json_pretty().unwrap(),
                b.template().unwrap().to_json_pretty().unwrap()
            );
        }
    }

    #[test]
    fn scenario_without_function() {
        let props = StaticSiteHostingProps::new("my-site-assets", RemovalPolicy::Destroy);
        let stack = StaticSiteHostingStack::new(&props).unwrap();
        assert_eq!(stack.bucket().bucket_name(), "my-site-assets");
        assert_eq!(stack.bucket().removal_policy(), Some(RemovalPolicy::Destroy));
        assert_eq!(stack.bucket_policy().bucket_name(), "my-site-assets");
        assert_eq!(stack.bucket().resource_pattern(), "my-site-assets/*");

        let value = template_json(&stack);
        let resources = value["Resources"].as_object().unwrap();
        assert_eq!(resources.len(), 4);
        let count = |ty: &str| resources.values().filter(|r| r["Type"] == ty).count();
        assert_eq!(count("AWS::S3::Bucket"), 1);
        assert_eq!(count("AWS::CloudFront::CloudFrontOriginAccessIdentity"), 1);
        assert_eq!(count("AWS::S3::BucketPolicy"), 1);
        assert_eq!(count("AWS::CloudFront::Distribution"), 1);

        let bucket = &resources[stack.bucket().logical_id()];
        assert_eq!(bucket["DeletionPolicy"], "Delete");
        assert_eq!(bucket["Properties"]["BucketName"], "my-site-assets");

        let distr = &resources[stack.distribution().logical_id()];
        let config = &distr["Properties"]["DistributionConfig"];
        assert!(config["DefaultCacheBehavior"].get("FunctionAssociations").is_none());
        assert!(config.get("Comment").is_none());
        assert_eq!(config["CustomErrorResponses"], json!([
            { "ErrorCachingMinTTL": 0, "ErrorCode": 403, "ResponseCode": 200, "ResponsePagePath": "/index.html" },
            { "ErrorCachingMinTTL": 0, "ErrorCode": 404, "ResponseCode": 200, "ResponsePagePath": "/index.html" },
        ]));
        assert_eq!(distr["DependsOn"], json!([stack.bucket_policy().logical_id()]));

        assert_eq!(value["Outputs"]["BucketName"]["Value"], json!({ "Ref": stack.bucket().logical_id() }));
        assert_eq!(
            value["Outputs"]["DistributionDomainName"]["Value"],
            json!({ "Fn::GetAtt": [stack.distribution().logical_id(), "DomainName"] })
        );
    }

    #[test]
    fn scenario_with_function() {
        let function = EdgeFunctionRef::from_arn(FUNCTION_ARN).unwrap();
        let props = StaticSiteHostingProps::new("my-site-assets", RemovalPolicy::Destroy).with_function(function);
        let stack = StaticSiteHostingStack::new(&props).unwrap();
        let value = template_json(&stack);
        let behavior = &value["Resources"][stack.distribution().logical_id()]["Properties"]["DistributionConfig"]["DefaultCacheBehavior"];
        assert_eq!(
            behavior["FunctionAssociations"],
            json!([{ "EventType": "viewer-request", "FunctionARN": FUNCTION_ARN }])
        );
    }

    #[test]
    fn retained_bucket_keeps_data() {
        let props = StaticSiteHostingProps::new("my-site-assets", RemovalPolicy::Retain);
        let stack = StaticSiteHostingStack::new(&props).unwrap();
        let value = template_json(&stack);
        let bucket = &value["Resources"][stack.bucket().logical_id()];
        assert_eq!(bucket["DeletionPolicy"], "Retain");
        assert_eq!(bucket["UpdateReplacePolicy"], "Retain");
    }

    #[test]
    fn configuration_errors_stop_declaration() {
        let bad_bucket = StaticSiteHostingProps::new("My_Site", RemovalPolicy::Destroy);
        assert!(matches!(StaticSiteHostingStack::new(&bad_bucket), Err(Error::InvalidBucketName { .. })));

        let missing_bucket = StaticSiteHostingProps::new("", RemovalPolicy::Destroy);
        assert!(matches!(StaticSiteHostingStack::new(&missing_bucket), Err(Error::MissingInput("bucket_name"))));

        let bad_stack = StaticSiteHostingProps::new("my-site-assets", RemovalPolicy::Destroy).with_stack_name("my_stack");
        assert!(matches!(StaticSiteHostingStack::new(&bad_stack), Err(Error::InvalidStackName { .. })));

        let wrong_trigger = StaticSiteHostingProps::new("my-site-assets", RemovalPolicy::Destroy)
            .with_function(EdgeFunctionRef::from_arn(FUNCTION_ARN).unwrap().for_event(FunctionEventType::OriginRequest));
        assert!(matches!(StaticSiteHostingStack::new(&wrong_trigger), Err(Error::IncompatibleTrigger { .. })));
    }

    #[test]
    fn stack_from_toml() {
        let props = StaticSiteHostingProps::from_toml_str(r#"
            stack_name = "prod-site"
            description = "production site"
            comment = "prod site"
            bucket_name = "my-site-assets"
            bucket_removal_policy = "RETAIN"

            [function]
            logical_id = "RewriteFunction"
        "#).unwrap();
        let stack = StaticSiteHostingStack::new(&props).unwrap();
        let value = template_json(&stack);
        assert_eq!(value["Description"], "production site");
        let config = &value["Resources"][stack.distribution().logical_id()]["Properties"]["DistributionConfig"];
        assert_eq!(config["Comment"], "prod site");
        let behavior = &value["Resources"][stack.distribution().logical_id()]["Properties"]["DistributionConfig"]["DefaultCacheBehavior"];
        assert_eq!(
            behavior["FunctionAssociations"][0]["FunctionARN"],
            json!({ "Fn::GetAtt": ["RewriteFunction", "FunctionARN"] })
        );
    }
}

use super::model::{GraphData, GraphLink, GraphNode, LinkType};

/// Small org dependency graph used when no file is given.
pub fn dependency_graph() -> GraphData {
    let nodes = vec![
        object("Account", "Account", 20.0),
        object("Opportunity", "Opportunity", 20.0),
        object("Contact", "Contact", 15.0),
        GraphNode::new("Update_Opp_Amount", "Flow", "Update Opp Amount").with_weight(10.0),
        GraphNode::new("Acc_After_Update", "Trigger", "Acc After Update").with_weight(8.0),
        GraphNode::new("Close_Date_Rule", "Field", "Close Date Rule").with_weight(5.0),
        GraphNode::new("Opp_Stage_Change", "Flow", "Opp Stage Change").with_weight(10.0),
        GraphNode::new("Risk_Score", "Field", "Risk Score").with_weight(5.0),
        GraphNode::new("AnnualRevenue", "Field", "AnnualRevenue").with_weight(5.0),
        GraphNode::new("Sync_ERP", "Trigger", "Sync ERP").with_weight(8.0),
    ];

    let links = vec![
        GraphLink::new("Account", "Opportunity", LinkType::Reference),
        GraphLink::new("Account", "Contact", LinkType::Reference),
        GraphLink::new("Update_Opp_Amount", "Opportunity", LinkType::Update),
        GraphLink::new("Acc_After_Update", "Account", LinkType::Trigger),
        GraphLink::new("Acc_After_Update", "Risk_Score", LinkType::Update),
        GraphLink::new("AnnualRevenue", "Risk_Score", LinkType::Reference),
        GraphLink::new("Opportunity", "Opp_Stage_Change", LinkType::Trigger),
        GraphLink::new("Opp_Stage_Change", "Close_Date_Rule", LinkType::Reference),
        GraphLink::new("Contact", "Sync_ERP", LinkType::Trigger),
    ];

    GraphData { nodes, links }
}

/// Opportunity lifecycle laid out in stage columns.
pub fn process_graph() -> GraphData {
    let stages = [
        ("Prospecting", 0),
        ("Qualification", 1),
        ("Needs_Analysis", 2),
        ("Proposal", 3),
        ("Negotiation", 4),
        ("Closed_Won", 5),
        ("Closed_Lost", 5),
    ];

    let mut nodes = stages
        .iter()
        .map(|(id, level)| {
            GraphNode::new(*id, "Stage", id.replace('_', " "))
                .with_level(*level)
                .with_weight(12.0)
                .with_metadata("object", "Opportunity")
        })
        .collect::<Vec<_>>();

    nodes.extend([
        GraphNode::new("Lead_Assignment", "Flow", "Lead Assignment Flow")
            .with_level(0)
            .with_metadata("apiName", "Lead_Assignment"),
        GraphNode::new("Qualify_Check", "ValidationRule", "Require Budget On Qualification")
            .with_level(1)
            .with_metadata("apiName", "Require_Budget"),
        GraphNode::new("Quote_Sync", "ApexClass", "QuoteSyncService")
            .with_level(3)
            .with_metadata("apiName", "QuoteSyncService"),
        GraphNode::new("Discount_Approval", "Flow", "Discount Approval Process")
            .with_level(4)
            .with_metadata("apiName", "Discount_Approval"),
        GraphNode::new("Won_Notify", "Trigger", "Opportunity After Update")
            .with_level(5)
            .with_metadata("apiName", "OpportunityTrigger"),
    ]);

    let mut links = stages
        .windows(2)
        .filter(|pair| pair[0].1 != pair[1].1)
        .map(|pair| GraphLink::new(pair[0].0, pair[1].0, LinkType::ProcessStep))
        .collect::<Vec<_>>();

    links.extend([
        GraphLink::new("Negotiation", "Closed_Lost", LinkType::ProcessStep),
        GraphLink::new("Lead_Assignment", "Prospecting", LinkType::Update),
        GraphLink::new("Qualify_Check", "Qualification", LinkType::Reference),
        GraphLink::new("Proposal", "Quote_Sync", LinkType::Trigger),
        GraphLink::new("Discount_Approval", "Negotiation", LinkType::Update),
        GraphLink::new("Closed_Won", "Won_Notify", LinkType::Trigger),
    ]);

    GraphData { nodes, links }
}

fn object(id: &str, label: &str, weight: f32) -> GraphNode {
    GraphNode::new(id, "Object", label)
        .with_weight(weight)
        .with_metadata("apiName", id)
}

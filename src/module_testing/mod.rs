mod static_website;
